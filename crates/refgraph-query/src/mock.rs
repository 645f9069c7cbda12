//! Scriptable [`QueryClient`] for tests.
//!
//! Available under `#[cfg(test)]` and with the `test-util` feature:
//!
//! ```toml
//! [dev-dependencies]
//! refgraph-query = { version = "...", features = ["test-util"] }
//! ```

use crate::client::{QueryApi, QueryClient};
use crate::error::Result;
use crate::result::QueryResult;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};

/// A query recorded by [`MockQueryClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedQuery {
    /// API the query was sent to.
    pub api: QueryApi,
    /// The SOQL text.
    pub soql: String,
}

type Responder = dyn Fn(QueryApi, &str) -> Result<QueryResult> + Send + Sync;

/// In-process [`QueryClient`] that answers through a closure and records
/// every query it receives, in call order.
///
/// # Example
///
/// ```rust,ignore
/// use refgraph_query::{MockQueryClient, QueryApi, QueryResult};
///
/// let client = MockQueryClient::new(|api, _soql| match api {
///     QueryApi::Data => Ok(QueryResult::default()),
///     QueryApi::Tooling => Ok(QueryResult::default()),
/// });
/// ```
pub struct MockQueryClient {
    responder: Box<Responder>,
    issued: Mutex<Vec<IssuedQuery>>,
}

impl MockQueryClient {
    /// Create a mock that answers every query with `responder`.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(QueryApi, &str) -> Result<QueryResult> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            issued: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that returns `data` for data queries and `tooling` for
    /// tooling queries, regardless of the SOQL text.
    pub fn with_results(data: QueryResult, tooling: QueryResult) -> Self {
        Self::new(move |api, _| match api {
            QueryApi::Data => Ok(data.clone()),
            QueryApi::Tooling => Ok(tooling.clone()),
        })
    }

    /// Every query received so far.
    pub fn issued(&self) -> Vec<IssuedQuery> {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of queries received for `api`.
    pub fn issued_count(&self, api: QueryApi) -> usize {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|q| q.api == api)
            .count()
    }
}

impl std::fmt::Debug for MockQueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockQueryClient")
            .field("issued", &self.issued())
            .field("responder", &"<fn>")
            .finish()
    }
}

#[async_trait]
impl QueryClient for MockQueryClient {
    async fn run(&self, api: QueryApi, soql: &str) -> Result<QueryResult> {
        self.issued
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(IssuedQuery {
                api,
                soql: soql.to_string(),
            });
        (self.responder)(api, soql)
    }
}
