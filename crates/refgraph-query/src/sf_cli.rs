//! Query client backed by the Salesforce CLI.
//!
//! The `sf` binary owns authentication: it resolves the org alias to a
//! stored session and refreshes tokens as needed. This client only spawns
//! `sf data query --json` and reads the JSON envelope it prints.

use crate::client::{QueryApi, QueryClient};
use crate::error::{QueryError, Result};
use crate::result::QueryResult;
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, trace};

/// Default command name of the Salesforce CLI.
pub const DEFAULT_COMMAND: &str = "sf";

const INSTALL_HINT: &str = "Install the Salesforce CLI (https://developer.salesforce.com/tools/salesforcecli) \
and authorize an org with `sf org login web --alias <alias>`.";

/// [`QueryClient`] that shells out to `sf data query`.
#[derive(Debug, Clone)]
pub struct SfCliClient {
    command: String,
    target_org: Option<String>,
}

impl SfCliClient {
    /// Create a client for `target_org` (alias or username).
    ///
    /// `None` uses the CLI's default org.
    #[must_use]
    pub fn new(target_org: Option<String>) -> Self {
        Self {
            command: DEFAULT_COMMAND.to_string(),
            target_org,
        }
    }

    /// Use a different executable instead of `sf`.
    #[must_use]
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// The org this client queries, if pinned.
    pub fn target_org(&self) -> Option<&str> {
        self.target_org.as_deref()
    }

    /// Arguments passed to the CLI for one query.
    fn args(&self, api: QueryApi, soql: &str) -> Vec<String> {
        let mut args = vec![
            "data".to_string(),
            "query".to_string(),
            "--query".to_string(),
            soql.to_string(),
            "--json".to_string(),
        ];
        if api == QueryApi::Tooling {
            args.push("--use-tooling-api".to_string());
        }
        if let Some(org) = &self.target_org {
            args.push("--target-org".to_string());
            args.push(org.clone());
        }
        args
    }
}

#[async_trait]
impl QueryClient for SfCliClient {
    async fn run(&self, api: QueryApi, soql: &str) -> Result<QueryResult> {
        debug!(command = %self.command, %api, soql, "Issuing query");

        let output = Command::new(&self.command)
            .args(self.args(api, soql))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    QueryError::not_found(&self.command, INSTALL_HINT)
                } else {
                    QueryError::spawn_failed(&self.command, e)
                }
            })?;

        trace!(status = ?output.status, bytes = output.stdout.len(), "Query command finished");

        match parse_envelope(&output.stdout) {
            Ok(result) => Ok(result),
            // Without a JSON envelope the only useful detail is on stderr.
            Err(QueryError::MalformedResponse(_)) if !output.status.success() => {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(QueryError::MalformedResponse(format!(
                    "{} exited with {}: {}",
                    self.command,
                    output.status,
                    stderr.trim()
                )))
            }
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: i64,
    #[serde(default)]
    result: Option<QueryResult>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse the `--json` envelope printed by `sf`.
///
/// A zero `status` carries the result set; anything else carries the error
/// `name` and `message`.
///
/// # Errors
///
/// Returns [`QueryError::Platform`] for error envelopes and
/// [`QueryError::MalformedResponse`] when the output is not an envelope.
pub fn parse_envelope(stdout: &[u8]) -> Result<QueryResult> {
    let envelope: Envelope = serde_json::from_slice(stdout)
        .map_err(|e| QueryError::MalformedResponse(e.to_string()))?;

    if envelope.status != 0 {
        return Err(QueryError::platform(
            envelope.name.unwrap_or_else(|| "UnknownError".to_string()),
            envelope
                .message
                .unwrap_or_else(|| format!("query failed with status {}", envelope.status)),
        ));
    }

    envelope
        .result
        .ok_or_else(|| QueryError::MalformedResponse("envelope has no result".to_string()))
}
