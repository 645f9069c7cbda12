//! Run context shared by every pipeline stage.
//!
//! Instead of reaching for a global connection or a global console, each
//! stage receives a [`RunContext`] carrying the query client and the
//! operator-facing [`Reporter`].

use refgraph_query::QueryClient;
use std::sync::{Mutex, PoisonError};

/// Operator-facing progress, warning and error messages.
///
/// These are the messages a person running the tool reads; diagnostics for
/// developers go through `tracing` instead.
pub trait Reporter: Send + Sync {
    /// A long-running step has started.
    fn progress(&self, message: &str);

    /// Informational message.
    fn info(&self, message: &str);

    /// Something went wrong but the run continues.
    fn warn(&self, message: &str);

    /// Something failed.
    fn error(&self, message: &str);

    /// The run completed.
    fn success(&self, message: &str);
}

/// Everything a stage needs from its surroundings.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    client: &'a dyn QueryClient,
    reporter: &'a dyn Reporter,
}

impl<'a> RunContext<'a> {
    /// Create a context from a client and a reporter.
    pub fn new(client: &'a dyn QueryClient, reporter: &'a dyn Reporter) -> Self {
        Self { client, reporter }
    }

    /// The query client.
    pub fn client(&self) -> &'a dyn QueryClient {
        self.client
    }

    /// The operator reporter.
    pub fn reporter(&self) -> &'a dyn Reporter {
        self.reporter
    }
}

impl std::fmt::Debug for RunContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("client", &"<dyn QueryClient>")
            .field("reporter", &"<dyn Reporter>")
            .finish()
    }
}

/// Severity of a reported message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// See [`Reporter::progress`].
    Progress,
    /// See [`Reporter::info`].
    Info,
    /// See [`Reporter::warn`].
    Warn,
    /// See [`Reporter::error`].
    Error,
    /// See [`Reporter::success`].
    Success,
}

/// [`Reporter`] that keeps every message in memory.
///
/// Useful when embedding the pipeline and in tests.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<(Level, String)>>,
}

impl MessageLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages, in order.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages of one level, in order.
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m)
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((level, message.to_string()));
    }
}

impl Reporter for MessageLog {
    fn progress(&self, message: &str) {
        self.push(Level::Progress, message);
    }

    fn info(&self, message: &str) {
        self.push(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(Level::Success, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_log_keeps_order_and_levels() {
        let log = MessageLog::new();
        log.progress("querying");
        log.warn("capped");
        log.success("done");

        assert_eq!(log.messages().len(), 3);
        assert_eq!(log.at(Level::Warn), vec!["capped".to_string()]);
        assert_eq!(log.messages()[0], (Level::Progress, "querying".to_string()));
    }
}
