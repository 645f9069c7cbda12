//! CLI argument parsing and dispatch.
//!
//! refgraph has a single command: resolve the Apex classes matching an
//! optional pattern, fetch everything that references them, and render the
//! resulting graph.
//!
//! # Example
//!
//! ```bash
//! refgraph --pattern Invoice --algorithm fdp
//! refgraph -p Service --edges count --format png --no-open
//! refgraph --target-org uat --print-dot > deps.dot
//! ```

mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

pub use execute::{load_config, run_options};
pub use types::EdgeModeArg;
pub use validators::{validate_algorithm, validate_format};

/// Draw the Apex class dependency graph of a Salesforce org
///
/// Queries the org through the `sf` CLI and renders the graph with Graphviz.
/// Settings can also come from `refgraph.yaml` in the working directory;
/// flags take precedence over the file.
#[derive(Parser, Debug)]
#[command(name = "refgraph")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Only graph classes whose name contains this text (case-sensitive)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Graphviz layout algorithm (dot, neato, fdp, sfdp, circo, twopi, osage, patchwork)
    #[arg(short, long, default_value = crate::render::DEFAULT_ALGORITHM, value_parser = validate_algorithm)]
    pub algorithm: String,

    /// Output image format passed to the renderer [default: svg]
    #[arg(long, value_parser = validate_format)]
    pub format: Option<String>,

    /// Org alias or username to query (defaults to the sf CLI's default org)
    #[arg(long)]
    pub target_org: Option<String>,

    /// How repeated references between the same two classes are drawn [default: keep]
    #[arg(long, value_enum)]
    pub edges: Option<EdgeModeArg>,

    /// Render the image but do not open it
    #[arg(long)]
    pub no_open: bool,

    /// Write the DOT text to stdout instead of rendering it
    #[arg(long, conflicts_with_all = ["no_open", "format"])]
    pub print_dot: bool,

    /// Configuration file (default: ./refgraph.yaml when present)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Run the pipeline.
    ///
    /// Returns exit code 2 when the graph was built but rendering failed.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded or if seed
    /// resolution or a dependency query fails.
    pub async fn execute(&self) -> Result<ExitCode> {
        execute::execute_run(self).await
    }
}
