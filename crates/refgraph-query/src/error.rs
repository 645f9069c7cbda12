//! Error types for platform queries.

use std::io;
use thiserror::Error;

/// Errors that can occur while issuing a query or decoding its rows.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query command could not be started.
    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        /// The command that failed to spawn.
        command: String,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The query command is not installed.
    #[error("{command} not found\n\n{install_hint}")]
    NotFound {
        /// The command that was not found.
        command: String,
        /// Installation instructions for the missing command.
        install_hint: String,
    },

    /// The platform rejected the query (bad SOQL, expired session, missing permission).
    #[error("{name}: {message}")]
    Platform {
        /// Error name reported by the platform (e.g. `MalformedQuery`).
        name: String,
        /// Human readable message reported by the platform.
        message: String,
    },

    /// The response could not be understood.
    #[error("malformed query response: {0}")]
    MalformedResponse(String),

    /// A returned row did not have the shape the caller asked for.
    #[error("malformed record at row {index}: {source}")]
    MalformedRecord {
        /// Zero-based row index within the result set.
        index: usize,
        /// The decoding error.
        #[source]
        source: serde_json::Error,
    },

    /// I/O error while talking to the query command.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl QueryError {
    /// Create a "not found" error with an install hint.
    #[must_use]
    pub fn not_found(command: &str, install_hint: &str) -> Self {
        Self::NotFound {
            command: command.to_string(),
            install_hint: install_hint.to_string(),
        }
    }

    /// Create a spawn failed error.
    #[must_use]
    pub fn spawn_failed(command: &str, source: io::Error) -> Self {
        Self::SpawnFailed {
            command: command.to_string(),
            source,
        }
    }

    /// Create a platform error from the name/message pair of an error response.
    #[must_use]
    pub fn platform(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Platform {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
