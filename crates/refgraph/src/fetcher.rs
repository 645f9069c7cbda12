//! Dependency fetching under the platform's query limits.
//!
//! Two limits shape the queries sent here:
//!
//! - **Query length**: seed ids are embedded in an `IN (...)` list, so a
//!   large seed set is split into batches whose rendered SOQL stays within
//!   `max_query_length` characters.
//! - **Row cap**: each query returns at most `row_cap` rows. A batch that
//!   reaches the cap may be missing rows; that is reported as a
//!   [`FetchWarning::PossibleTruncation`] and the run carries on with what
//!   it has.
//!
//! Batches are independent, so they may be in flight concurrently. Results
//! are always merged in batch order.

use crate::context::RunContext;
use crate::domain::{ComponentId, ComponentTypes, DependencyEdge, SeedSet};
use crate::error::{Error, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use refgraph_query::soql::{self, Condition, SoqlQuery, IN_SEPARATOR};
use refgraph_query::QueryResult;
use std::fmt;
use tracing::{debug, info};

/// Object holding dependency records (tooling API only).
pub const DEPENDENCY_OBJECT: &str = "MetadataComponentDependency";

/// Columns selected from [`DEPENDENCY_OBJECT`].
pub const DEPENDENCY_FIELDS: [&str; 7] = [
    "Id",
    "MetadataComponentId",
    "MetadataComponentName",
    "MetadataComponentType",
    "RefMetadataComponentId",
    "RefMetadataComponentName",
    "RefMetadataComponentType",
];

/// Maximum rows a single query returns.
pub const DEFAULT_ROW_CAP: usize = 10_000;

/// Maximum length of a SOQL statement, in characters.
pub const DEFAULT_MAX_QUERY_LENGTH: usize = 100_000;

/// Batches in flight at once.
pub const DEFAULT_MAX_CONCURRENT_QUERIES: usize = 4;

/// Limits the fetcher works within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Rows at which a batch counts as possibly truncated.
    pub row_cap: usize,
    /// Longest SOQL statement a batch may render to.
    pub max_query_length: usize,
    /// Batches in flight at once (1 means strictly sequential).
    pub max_concurrent_queries: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            row_cap: DEFAULT_ROW_CAP,
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            max_concurrent_queries: DEFAULT_MAX_CONCURRENT_QUERIES,
        }
    }
}

/// Non-fatal problems found while fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchWarning {
    /// A batch reached the row cap, so some of its edges may be missing.
    PossibleTruncation {
        /// Zero-based batch index.
        batch: usize,
        /// Rows the batch returned.
        rows: usize,
        /// Total the platform reported for the batch.
        total_size: usize,
        /// The cap that was reached.
        row_cap: usize,
    },
}

impl fmt::Display for FetchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PossibleTruncation {
                batch,
                rows,
                total_size,
                row_cap,
            } => write!(
                f,
                "Possible max result exceeded: batch {} returned {rows} rows \
                 (reported total {total_size}, cap {row_cap}); the graph may be incomplete",
                batch + 1
            ),
        }
    }
}

/// Edges fetched for a seed set, plus what went wrong along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Merged edges, in batch order.
    pub edges: Vec<DependencyEdge>,
    /// Non-fatal warnings.
    pub warnings: Vec<FetchWarning>,
    /// Number of queries issued.
    pub batches: usize,
}

/// Build the dependency query.
///
/// `targets` restricts the referenced side to the given ids; `None` leaves
/// that filter out. The type filters are always present.
pub fn dependency_query(types: &ComponentTypes, targets: Option<&[ComponentId]>) -> SoqlQuery {
    let query = SoqlQuery::select(DEPENDENCY_FIELDS, DEPENDENCY_OBJECT)
        .filter(Condition::eq("RefMetadataComponentType", &types.target))
        .filter(Condition::in_list(
            "MetadataComponentType",
            types.referencing.iter().cloned(),
        ));
    match targets {
        Some(ids) => query.filter(Condition::in_list(
            "RefMetadataComponentId",
            ids.iter().map(|id| id.as_str().to_string()),
        )),
        None => query,
    }
}

/// Split `seeds` into batches whose dependency query renders to at most
/// `max_query_length` characters.
///
/// Batches are filled greedily in seed order, so concatenating them gives
/// back the seed set.
///
/// # Errors
///
/// Returns `Error::Config` if a single id does not fit into a query.
pub fn plan_batches(
    types: &ComponentTypes,
    seeds: &SeedSet,
    max_query_length: usize,
) -> Result<Vec<Vec<ComponentId>>> {
    // Length of the query with an empty IN list; every id adds its quoted
    // literal plus a separator after the first.
    let base = dependency_query(types, Some(&[] as &[ComponentId])).to_soql().len();

    let mut batches = Vec::new();
    let mut current: Vec<ComponentId> = Vec::new();
    let mut length = base;

    for id in seeds {
        let literal = soql::quote(id.as_str()).len();
        if base + literal > max_query_length {
            return Err(Error::Config(format!(
                "component id '{id}' does not fit in a query of at most {max_query_length} characters"
            )));
        }

        let cost = if current.is_empty() {
            literal
        } else {
            literal + IN_SEPARATOR.len()
        };

        if length + cost > max_query_length {
            batches.push(std::mem::take(&mut current));
            length = base + literal;
        } else {
            length += cost;
        }
        current.push(id.clone());
    }

    if !current.is_empty() {
        batches.push(current);
    }
    Ok(batches)
}

/// Fetch every edge whose target is in `seeds`.
///
/// An empty seed set issues a single query without the target id filter.
///
/// # Errors
///
/// - `Error::Config` if an id does not fit in a query
/// - `Error::RemoteQuery` if any batch fails or returns a malformed row;
///   there are no retries
pub async fn fetch_dependencies(
    ctx: &RunContext<'_>,
    types: &ComponentTypes,
    limits: &FetchLimits,
    seeds: &SeedSet,
) -> Result<FetchOutcome> {
    let queries: Vec<String> = if seeds.is_empty() {
        debug!("Empty seed set, querying without a target id filter");
        vec![dependency_query(types, None).to_soql()]
    } else {
        plan_batches(types, seeds, limits.max_query_length)?
            .iter()
            .map(|batch| dependency_query(types, Some(batch.as_slice())).to_soql())
            .collect()
    };

    ctx.reporter().progress(&format!(
        "Querying dependencies of {} components ({} {})",
        seeds.len(),
        queries.len(),
        if queries.len() == 1 { "query" } else { "queries" }
    ));
    debug!(
        batches = queries.len(),
        concurrency = limits.max_concurrent_queries,
        "Planned dependency queries"
    );

    // `buffered` yields in input order regardless of completion order.
    let results: Vec<QueryResult> = stream::iter(
        queries
            .iter()
            .map(|soql| ctx.client().query_tooling(soql)),
    )
    .buffered(limits.max_concurrent_queries.max(1))
    .try_collect()
    .await?;

    let mut outcome = FetchOutcome {
        batches: queries.len(),
        ..FetchOutcome::default()
    };

    for (batch, result) in results.iter().enumerate() {
        if result.reaches_cap(limits.row_cap) {
            let warning = FetchWarning::PossibleTruncation {
                batch,
                rows: result.len(),
                total_size: result.total_size,
                row_cap: limits.row_cap,
            };
            debug!(batch, rows = result.len(), total_size = result.total_size, "Batch reached the row cap");
            ctx.reporter().warn(&warning.to_string());
            outcome.warnings.push(warning);
        }
        outcome.edges.extend(result.decode::<DependencyEdge>()?);
    }

    info!(edges = outcome.edges.len(), batches = outcome.batches, "Fetched dependencies");
    ctx.reporter()
        .info(&format!("Total dependencies: {}", outcome.edges.len()));
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Level, MessageLog};
    use crate::test_support::{dependency_row, dependency_rows};
    use refgraph_query::{MockQueryClient, QueryApi, QueryError};
    use rstest::rstest;

    fn seeds(ids: &[&str]) -> SeedSet {
        ids.iter().map(|id| ComponentId::from(*id)).collect()
    }

    fn numbered_seeds(count: usize) -> SeedSet {
        (0..count)
            .map(|i| ComponentId::new(format!("01p{i:015}")))
            .collect()
    }

    #[test]
    fn test_dependency_query_with_targets() {
        let soql = dependency_query(
            &ComponentTypes::default(),
            Some(&[ComponentId::from("a"), ComponentId::from("b")][..]),
        )
        .to_soql();
        assert!(soql.starts_with("SELECT Id, MetadataComponentId, MetadataComponentName"));
        assert!(soql.contains("FROM MetadataComponentDependency"));
        assert!(soql.contains("WHERE RefMetadataComponentType = 'ApexClass'"));
        assert!(soql.contains("AND MetadataComponentType IN ('ApexClass','ApexTrigger')"));
        assert!(soql.ends_with("AND RefMetadataComponentId IN ('a','b')"));
    }

    #[test]
    fn test_dependency_query_without_targets() {
        let soql = dependency_query(&ComponentTypes::default(), None).to_soql();
        assert!(!soql.contains("RefMetadataComponentId IN"));
        assert!(soql.contains("MetadataComponentType IN"));
    }

    #[test]
    fn test_small_seed_set_is_one_batch() {
        let batches = plan_batches(&ComponentTypes::default(), &seeds(&["a", "b", "c"]), 100_000)
            .unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
    }

    #[rstest]
    #[case::few(10)]
    #[case::many(500)]
    #[case::lots(2_000)]
    fn test_batches_respect_length_and_cover_seeds(#[case] count: usize) {
        let types = ComponentTypes::default();
        let seeds = numbered_seeds(count);
        let max = 2_000;

        let batches = plan_batches(&types, &seeds, max).unwrap();

        for batch in &batches {
            assert!(!batch.is_empty());
            let len = dependency_query(&types, Some(batch.as_slice())).to_soql().len();
            assert!(len <= max, "batch renders to {len} > {max}");
        }
        let flattened: Vec<ComponentId> = batches.into_iter().flatten().collect();
        assert_eq!(flattened, seeds.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn test_batches_are_packed_tightly() {
        let types = ComponentTypes::default();
        let seeds = numbered_seeds(50);
        let max = 1_000;

        let batches = plan_batches(&types, &seeds, max).unwrap();

        // Adding the next id to any full batch would overflow.
        for window in batches.windows(2) {
            let mut grown = window[0].clone();
            grown.push(window[1][0].clone());
            assert!(dependency_query(&types, Some(grown.as_slice())).to_soql().len() > max);
        }
    }

    #[test]
    fn test_oversized_id_is_config_error() {
        let err = plan_batches(&ComponentTypes::default(), &seeds(&["a"]), 50).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[tokio::test]
    async fn test_empty_seed_set_queries_without_id_filter() {
        let client = MockQueryClient::with_results(
            QueryResult::default(),
            dependency_rows(&[("Bar", "Foo")]),
        );
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);

        let outcome = fetch_dependencies(
            &ctx,
            &ComponentTypes::default(),
            &FetchLimits::default(),
            &SeedSet::new(),
        )
        .await
        .unwrap();

        let issued = client.issued();
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].api, QueryApi::Tooling);
        assert!(!issued[0].soql.contains("RefMetadataComponentId IN"));
        assert_eq!(outcome.edges.len(), 1);
        assert_eq!(outcome.batches, 1);
    }

    #[tokio::test]
    async fn test_batched_fetch_equals_concatenated_batches() {
        let types = ComponentTypes::default();
        let seeds = numbered_seeds(120);
        let limits = FetchLimits {
            max_query_length: 1_500,
            max_concurrent_queries: 3,
            ..FetchLimits::default()
        };

        // One edge per seed id embedded in the query, so each batch's answer
        // depends only on its own ids.
        let respond = |_: QueryApi, soql: &str| {
            let ids = soql
                .rsplit_once("IN (")
                .map(|(_, list)| list.trim_end_matches(')'))
                .unwrap_or_default();
            let rows = ids
                .split(',')
                .map(|id| dependency_row(&format!("Src{}", id.trim_matches('\'')), id.trim_matches('\'')))
                .collect();
            Ok(QueryResult::from_rows(rows))
        };

        let client = MockQueryClient::new(respond);
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);
        let outcome = fetch_dependencies(&ctx, &types, &limits, &seeds).await.unwrap();

        let batches = plan_batches(&types, &seeds, limits.max_query_length).unwrap();
        assert!(batches.len() > 1);
        assert_eq!(outcome.batches, batches.len());

        let mut expected = Vec::new();
        for batch in &batches {
            let soql = dependency_query(&types, Some(batch.as_slice())).to_soql();
            let result = respond(QueryApi::Tooling, &soql).unwrap();
            expected.extend(result.decode::<DependencyEdge>().unwrap());
        }
        assert_eq!(outcome.edges, expected);
        assert_eq!(outcome.edges.len(), seeds.len());
    }

    #[tokio::test]
    async fn test_batch_at_row_cap_warns_and_continues() {
        let client = MockQueryClient::with_results(
            QueryResult::default(),
            dependency_rows(&[("A", "B"), ("C", "B"), ("D", "B")]),
        );
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);
        let limits = FetchLimits {
            row_cap: 3,
            ..FetchLimits::default()
        };

        let outcome = fetch_dependencies(&ctx, &ComponentTypes::default(), &limits, &seeds(&["id-B"]))
            .await
            .unwrap();

        assert_eq!(outcome.edges.len(), 3);
        assert_eq!(
            outcome.warnings,
            vec![FetchWarning::PossibleTruncation {
                batch: 0,
                rows: 3,
                total_size: 3,
                row_cap: 3
            }]
        );
        let warnings = log.at(Level::Warn);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("may be incomplete"));
        assert!(log
            .at(Level::Info)
            .contains(&"Total dependencies: 3".to_string()));
    }

    #[tokio::test]
    async fn test_below_cap_does_not_warn() {
        let client = MockQueryClient::with_results(
            QueryResult::default(),
            dependency_rows(&[("A", "B")]),
        );
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);

        let outcome = fetch_dependencies(
            &ctx,
            &ComponentTypes::default(),
            &FetchLimits::default(),
            &seeds(&["id-B"]),
        )
        .await
        .unwrap();

        assert!(outcome.warnings.is_empty());
        assert!(log.at(Level::Warn).is_empty());
    }

    #[tokio::test]
    async fn test_failed_batch_aborts_fetch() {
        let client = MockQueryClient::new(|_, _| {
            Err(QueryError::platform("QUERY_TIMEOUT", "Your query request was running for too long."))
        });
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);

        let err = fetch_dependencies(
            &ctx,
            &ComponentTypes::default(),
            &FetchLimits::default(),
            &seeds(&["a"]),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::RemoteQuery(QueryError::Platform { .. })));
    }
}
