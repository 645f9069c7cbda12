//! Error types for refgraph runs.

use refgraph_query::QueryError;
use std::io;
use thiserror::Error;

/// Errors that abort a run.
///
/// Rendering problems are not part of this type: the render stage reports
/// them and returns a failed [`RenderOutcome`](crate::render::RenderOutcome)
/// instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The component query matched nothing.
    #[error("No {component_type} components found in the org{}", describe_pattern(.pattern))]
    NoResults {
        /// The component type that was queried.
        component_type: String,
        /// The name filter, if any.
        pattern: Option<String>,
    },

    /// A query could not be sent, was rejected, or returned malformed rows.
    #[error("Remote query failed: {0}")]
    RemoteQuery(#[from] QueryError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

fn describe_pattern(pattern: &Option<String>) -> String {
    match pattern {
        Some(p) => format!(" matching '{p}'"),
        None => String::new(),
    }
}

/// A specialized Result type for refgraph operations.
pub type Result<T> = std::result::Result<T, Error>;
