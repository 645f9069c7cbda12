//! The query client trait.

use crate::error::Result;
use crate::result::QueryResult;
use async_trait::async_trait;
use std::fmt;

/// Which platform API a query is sent to.
///
/// Ordinary sObjects (`ApexClass`) live behind the data API, while metadata
/// objects such as `MetadataComponentDependency` are only queryable through
/// the tooling API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryApi {
    /// The regular data API.
    Data,
    /// The tooling API.
    Tooling,
}

impl fmt::Display for QueryApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => write!(f, "data"),
            Self::Tooling => write!(f, "tooling"),
        }
    }
}

/// Read-only access to the platform's query endpoints.
///
/// Each call returns one bounded result set. Implementations do not retry and
/// do not page beyond what the endpoint hands back; detecting a capped result
/// is the caller's job (see [`QueryResult::reaches_cap`]).
///
/// The trait is object-safe so callers can hold a `&dyn QueryClient`.
#[async_trait]
pub trait QueryClient: Send + Sync {
    /// Run `soql` against `api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be sent, the platform rejects it,
    /// or the response cannot be parsed.
    async fn run(&self, api: QueryApi, soql: &str) -> Result<QueryResult>;

    /// Run `soql` against the data API.
    async fn query(&self, soql: &str) -> Result<QueryResult> {
        self.run(QueryApi::Data, soql).await
    }

    /// Run `soql` against the tooling API.
    async fn query_tooling(&self, soql: &str) -> Result<QueryResult> {
        self.run(QueryApi::Tooling, soql).await
    }
}
