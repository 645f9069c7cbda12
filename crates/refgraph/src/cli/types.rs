//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::graph::EdgeMode;

/// Edge multiplicity for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeModeArg {
    /// One edge per dependency record
    Keep,
    /// One edge per (source, target) pair
    Dedupe,
    /// One edge per pair, labelled with its record count
    Count,
}

impl std::fmt::Display for EdgeModeArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        EdgeMode::from(*self).fmt(f)
    }
}

impl From<EdgeModeArg> for EdgeMode {
    fn from(arg: EdgeModeArg) -> Self {
        match arg {
            EdgeModeArg::Keep => EdgeMode::Keep,
            EdgeModeArg::Dedupe => EdgeMode::Dedupe,
            EdgeModeArg::Count => EdgeMode::Count,
        }
    }
}
