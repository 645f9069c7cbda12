//! refgraph - Apex class dependency graphs for Salesforce orgs.
//!
//! The pipeline runs leaves first:
//!
//! 1. [`resolver`] resolves the seed classes matching an optional pattern.
//! 2. [`fetcher`] pulls every dependency record targeting them, in batches
//!    that respect the platform's row cap and query length limit.
//! 3. [`graph`] folds the records into a directed multigraph.
//! 4. [`dot`] serializes the graph as Graphviz DOT.
//! 5. [`render`] hands the DOT text to Graphviz and opens the image.
//!
//! [`pipeline::run`] ties the stages together; the `refgraph` binary adds
//! configuration, flags and console output on top.
//!
//! # Example
//!
//! ```no_run
//! use refgraph::context::{MessageLog, RunContext};
//! use refgraph::pipeline::{run, OutputTarget, RunOptions};
//! use refgraph_query::SfCliClient;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SfCliClient::new(None);
//!     let log = MessageLog::new();
//!     let ctx = RunContext::new(&client, &log);
//!     let options = RunOptions {
//!         pattern: Some("Invoice".to_string()),
//!         output: OutputTarget::PrintDot,
//!         ..RunOptions::default()
//!     };
//!     let summary = run(&ctx, &options).await?;
//!     print!("{}", summary.description);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod context;
pub mod domain;
pub mod dot;
pub mod error;
pub mod fetcher;
pub mod graph;
pub mod pipeline;
pub mod render;
pub mod resolver;

pub mod config;
pub mod output;

// Public CLI module (needed by binary)
pub mod cli;

#[cfg(test)]
mod test_support;
