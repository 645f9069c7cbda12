//! Query plumbing for the platform's data and tooling APIs.
//!
//! This crate knows how to phrase SOQL statements, how to send them to the
//! platform and how to turn the returned rows into typed records. It does not
//! know anything about dependency graphs.
//!
//! # Example
//!
//! ```no_run
//! use refgraph_query::{QueryClient, SfCliClient};
//! use refgraph_query::soql::{Condition, SoqlQuery};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> refgraph_query::Result<()> {
//!     let client = SfCliClient::new(Some("my-org".to_string()));
//!     let soql = SoqlQuery::select(["Id", "Name"], "ApexClass")
//!         .filter(Condition::contains("Name", "Service"))
//!         .to_soql();
//!     let result = client.query(&soql).await?;
//!     println!("{} classes", result.total_size);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod error;
pub mod result;
pub mod sf_cli;
pub mod soql;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::{QueryApi, QueryClient};
pub use error::{QueryError, Result};
pub use result::{QueryResult, Row};
pub use sf_cli::SfCliClient;

#[cfg(any(test, feature = "test-util"))]
pub use mock::{IssuedQuery, MockQueryClient};
