//! Command execution logic.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::ExitCode;

use super::Cli;
use crate::config::RefgraphConfig;
use crate::context::RunContext;
use crate::graph::EdgeMode;
use crate::output::{self, ConsoleReporter, OutputConfig};
use crate::pipeline::{self, OutputTarget, RunOptions};
use crate::render::Viewer;
use refgraph_query::SfCliClient;

/// Exit code when the graph was built but could not be rendered or opened.
const RENDER_FAILURE_EXIT_CODE: u8 = 2;

/// Load the configuration named by `--config`, or discover it in `dir`.
///
/// # Errors
///
/// Returns the load or validation error of the chosen file.
pub async fn load_config(cli: &Cli, dir: &Path) -> crate::error::Result<RefgraphConfig> {
    match &cli.config {
        Some(path) => RefgraphConfig::load(path).await,
        None => RefgraphConfig::discover(dir).await,
    }
}

/// Merge flags over the configuration file.
pub fn run_options(cli: &Cli, config: &RefgraphConfig) -> RunOptions {
    let output = if cli.print_dot {
        OutputTarget::PrintDot
    } else {
        let mut render = config.render_options(&cli.algorithm);
        if let Some(format) = &cli.format {
            render.format.clone_from(format);
        }
        if cli.no_open {
            render.viewer = Viewer::Disabled;
        }
        OutputTarget::Render(render)
    };

    RunOptions {
        pattern: cli.pattern.clone(),
        types: config.component_types(),
        limits: config.fetch_limits(),
        edge_mode: cli.edges.map_or(config.edges, EdgeMode::from),
        output,
    }
}

/// Execute a run against the org.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, if seed
/// resolution or a dependency query fails, or if stdout/stderr cannot be
/// written. Render failures are not errors; they give exit code 2.
pub async fn execute_run(cli: &Cli) -> Result<ExitCode> {
    let current_dir = std::env::current_dir()?;
    let config = load_config(cli, &current_dir)
        .await
        .context("Failed to load configuration")?;
    let options = run_options(cli, &config);

    let target_org = cli.target_org.clone().or_else(|| config.target_org.clone());
    let client = SfCliClient::new(target_org);

    let output_config = OutputConfig::from_env();
    let reporter = ConsoleReporter::new(output_config);
    let ctx = RunContext::new(&client, &reporter);

    let summary = pipeline::run(&ctx, &options).await?;

    if cli.print_dot {
        output::print_dot(&summary.description)?;
    }
    output::print_summary(&summary, &output_config)?;

    if summary.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(RENDER_FAILURE_EXIT_CODE))
    }
}
