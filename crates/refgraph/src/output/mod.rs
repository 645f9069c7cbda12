//! Operator-facing output.
//!
//! Progress, warnings and errors are written to stderr through
//! [`ConsoleReporter`] so stdout stays free for `--print-dot`.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers (semantic colors, icons)

pub mod color;

use crate::context::{Level, Reporter};
use crate::pipeline::RunSummary;
use crate::render::RenderOutcome;
use std::env;
use std::io::{self, Write};

use color::{bold, dimmed, format_message};

/// Configuration for output formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new OutputConfig with explicit values.
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an OutputConfig by reading from environment variables.
    ///
    /// Reads:
    /// - `REFGRAPH_ASCII`: Set to "1" or "true" for ASCII-only icons (default: false)
    /// - `NO_COLOR`: Standard env var to disable colors (any value disables colors)
    /// - `REFGRAPH_COLOR`: Set to "0" or "false" to disable colors (default: true)
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let use_ascii = match var("REFGRAPH_ASCII") {
            Some(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Some(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Some(v) => {
                tracing::warn!(
                    env_var = "REFGRAPH_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            None => false,
        };

        // Respect NO_COLOR standard (https://no-color.org/)
        let use_colors = var("NO_COLOR").is_none()
            && var("REFGRAPH_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// [`Reporter`] that prints each message as one line on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    config: OutputConfig,
}

impl ConsoleReporter {
    /// Create a reporter with the given formatting.
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    fn emit(&self, level: Level, message: &str) {
        let line = format_message(level, message, &self.config);
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        // A closed stderr is not worth failing the run over.
        let _ = writeln!(handle, "{line}");
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&self, message: &str) {
        self.emit(Level::Progress, message);
    }

    fn info(&self, message: &str) {
        self.emit(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.emit(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.emit(Level::Error, message);
    }

    fn success(&self, message: &str) {
        self.emit(Level::Success, message);
    }
}

/// Write the end-of-run summary block.
pub fn write_summary<W: Write>(
    w: &mut W,
    summary: &RunSummary,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", bold("Summary", config))?;
    writeln!(w, "  Seed components:  {}", summary.seeds)?;
    writeln!(w, "  Dependencies:     {}", summary.edges)?;
    writeln!(
        w,
        "  Graph:            {} nodes, {} edges",
        summary.stats.nodes, summary.stats.edges
    )?;
    if summary.stats.cycles > 0 {
        writeln!(
            w,
            "  Cycles:           {} ({} components involved)",
            summary.stats.cycles, summary.stats.components_in_cycles
        )?;
    }
    if !summary.warnings.is_empty() {
        writeln!(
            w,
            "  Warnings:         {}",
            color::warning(&summary.warnings.len().to_string(), config)
        )?;
    }
    let render = match &summary.render {
        None => dimmed("skipped", config),
        Some(RenderOutcome::Rendered { output }) => {
            color::success(&output.display().to_string(), config)
        }
        Some(RenderOutcome::Failed { stage, .. }) => {
            color::error(&format!("failed while {stage}"), config)
        }
    };
    writeln!(w, "  Output:           {render}")?;
    Ok(())
}

/// Print the end-of-run summary to stderr.
pub fn print_summary(summary: &RunSummary, config: &OutputConfig) -> io::Result<()> {
    let stderr = io::stderr();
    let mut handle = stderr.lock();
    write_summary(&mut handle, summary, config)
}

/// Print the DOT text to stdout.
pub fn print_dot(description: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(description.as_bytes())?;
    handle.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::FetchWarning;
    use crate::graph::GraphStats;
    use crate::render::{RenderError, RenderStage};
    use rstest::rstest;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn config_from(pairs: &[(&str, &str)]) -> OutputConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        OutputConfig::from_vars(|name| vars.get(name).cloned())
    }

    fn summary(render: Option<RenderOutcome>) -> RunSummary {
        RunSummary {
            seeds: 3,
            edges: 7,
            warnings: vec![FetchWarning::PossibleTruncation {
                batch: 0,
                rows: 10,
                total_size: 10,
                row_cap: 10,
            }],
            stats: GraphStats {
                nodes: 5,
                edges: 6,
                references: 7,
                cycles: 1,
                components_in_cycles: 2,
            },
            description: String::new(),
            render,
        }
    }

    fn plain() -> OutputConfig {
        OutputConfig::new(true, false)
    }

    #[rstest]
    #[case(&[], false, true)]
    #[case(&[("NO_COLOR", "")], false, false)]
    #[case(&[("REFGRAPH_COLOR", "0")], false, false)]
    #[case(&[("REFGRAPH_COLOR", "FALSE")], false, false)]
    #[case(&[("REFGRAPH_COLOR", "1")], false, true)]
    #[case(&[("REFGRAPH_ASCII", "true")], true, true)]
    #[case(&[("REFGRAPH_ASCII", "1")], true, true)]
    #[case(&[("REFGRAPH_ASCII", "maybe")], false, true)]
    fn test_config_from_env(
        #[case] vars: &[(&str, &str)],
        #[case] use_ascii: bool,
        #[case] use_colors: bool,
    ) {
        assert_eq!(config_from(vars), OutputConfig::new(use_ascii, use_colors));
    }

    #[test]
    fn test_summary_lists_counts_and_output() {
        let outcome = RenderOutcome::Rendered {
            output: PathBuf::from("out.svg"),
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary(Some(outcome)), &plain()).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Summary\n"));
        assert!(text.contains("Seed components:  3"));
        assert!(text.contains("Dependencies:     7"));
        assert!(text.contains("5 nodes, 6 edges"));
        assert!(text.contains("Cycles:           1 (2 components involved)"));
        assert!(text.contains("Warnings:         1"));
        assert!(text.contains("Output:           out.svg"));
    }

    #[test]
    fn test_summary_for_skipped_and_failed_render() {
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary(None), &plain()).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("Output:           skipped"));

        let failed = RenderOutcome::Failed {
            stage: RenderStage::InvokingRenderer,
            error: RenderError::MissingOutput {
                path: PathBuf::from("out.svg"),
            },
        };
        let mut buf = Vec::new();
        write_summary(&mut buf, &summary(Some(failed)), &plain()).unwrap();
        assert!(String::from_utf8(buf)
            .unwrap()
            .contains("failed while invoking the renderer"));
    }
}
