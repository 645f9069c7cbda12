//! refgraph CLI binary.

use anyhow::Result;
use refgraph::cli::Cli;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Main entry point for the refgraph CLI.
///
/// Every stage runs sequentially, so a current-thread runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    // Example: RUST_LOG=refgraph=debug,refgraph_query=trace refgraph -p Foo
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("refgraph=info,refgraph_query=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting refgraph");

    let cli = Cli::parse_args();
    let code = cli.execute().await?;

    tracing::debug!("refgraph finished");
    Ok(code)
}
