//! The end-to-end run: resolve, fetch, aggregate, serialize, render.
//!
//! Each stage fully materializes its output before the next begins.
//! Resolver and fetcher errors abort the run; render failures are contained
//! in the returned [`RunSummary`].

use crate::context::RunContext;
use crate::domain::ComponentTypes;
use crate::dot::to_dot;
use crate::error::Result;
use crate::fetcher::{fetch_dependencies, FetchLimits, FetchWarning};
use crate::graph::{build_graph, EdgeMode, GraphStats};
use crate::render::{render, RenderOptions, RenderOutcome};
use crate::resolver::resolve_seed_components;
use tracing::{debug, info};

/// What happens to the DOT text once it is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Hand it to the renderer.
    Render(RenderOptions),
    /// Return it to the caller without rendering.
    PrintDot,
}

impl Default for OutputTarget {
    fn default() -> Self {
        Self::Render(RenderOptions::default())
    }
}

/// Options for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Name substring the seed components must contain.
    pub pattern: Option<String>,
    /// Target and referencing component types.
    pub types: ComponentTypes,
    /// Row cap, query length and concurrency limits.
    pub limits: FetchLimits,
    /// Edge multiplicity.
    pub edge_mode: EdgeMode,
    /// Render or print.
    pub output: OutputTarget,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    /// Number of seed components.
    pub seeds: usize,
    /// Number of dependency records fetched.
    pub edges: usize,
    /// Non-fatal fetch warnings.
    pub warnings: Vec<FetchWarning>,
    /// Shape of the built graph.
    pub stats: GraphStats,
    /// The DOT text.
    pub description: String,
    /// `None` when rendering was skipped.
    pub render: Option<RenderOutcome>,
}

impl RunSummary {
    /// `true` unless the render stage ran and failed.
    pub fn is_success(&self) -> bool {
        self.render.as_ref().is_none_or(RenderOutcome::is_success)
    }
}

/// Run the whole pipeline.
///
/// # Errors
///
/// Returns resolver and fetcher errors (`NoResults`, `RemoteQuery`,
/// `Config`). A failed render is reported and recorded in the summary.
pub async fn run(ctx: &RunContext<'_>, options: &RunOptions) -> Result<RunSummary> {
    debug!(?options, "Starting run");

    let seeds = resolve_seed_components(ctx, &options.types, options.pattern.as_deref()).await?;
    let fetched = fetch_dependencies(ctx, &options.types, &options.limits, &seeds).await?;

    let graph = build_graph(&fetched.edges, options.edge_mode);
    let stats = graph.stats();
    info!(
        nodes = stats.nodes,
        edges = stats.edges,
        cycles = stats.cycles,
        "Built dependency graph"
    );
    ctx.reporter().info(&format!(
        "Graph: {} components, {} edges, {} {}",
        stats.nodes,
        stats.edges,
        stats.cycles,
        if stats.cycles == 1 { "cycle" } else { "cycles" }
    ));

    let description = to_dot(&graph);

    let render = match &options.output {
        OutputTarget::Render(render_options) => {
            Some(render(ctx.reporter(), &description, render_options).await)
        }
        OutputTarget::PrintDot => {
            debug!("Skipping render");
            None
        }
    };

    Ok(RunSummary {
        seeds: seeds.len(),
        edges: fetched.edges.len(),
        warnings: fetched.warnings,
        stats,
        description,
        render,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Level, MessageLog};
    use crate::error::Error;
    use crate::test_support::{class_rows, dependency_rows};
    use refgraph_query::{MockQueryClient, QueryApi, QueryResult};

    fn print_dot() -> RunOptions {
        RunOptions {
            output: OutputTarget::PrintDot,
            ..RunOptions::default()
        }
    }

    #[tokio::test]
    async fn test_print_dot_skips_render() {
        let client = MockQueryClient::with_results(
            class_rows(&[("id-Foo", "Foo")]),
            dependency_rows(&[("Bar", "Foo")]),
        );
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);

        let summary = run(&ctx, &print_dot()).await.unwrap();

        assert_eq!(summary.seeds, 1);
        assert_eq!(summary.edges, 1);
        assert_eq!(summary.description, "digraph G {\n  Bar -> Foo;\n}\n");
        assert!(summary.render.is_none());
        assert!(summary.is_success());
        assert!(log.at(Level::Info).iter().any(|m| m.contains("1 edges")));
    }

    #[tokio::test]
    async fn test_count_mode_flows_through() {
        let client = MockQueryClient::with_results(
            class_rows(&[("id-Foo", "Foo")]),
            dependency_rows(&[("Bar", "Foo"), ("Bar", "Foo")]),
        );
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);
        let options = RunOptions {
            edge_mode: EdgeMode::Count,
            ..print_dot()
        };

        let summary = run(&ctx, &options).await.unwrap();

        assert_eq!(summary.edges, 2);
        assert_eq!(summary.stats.edges, 1);
        assert!(summary.description.contains("Bar -> Foo [label=\"2\", weight=2];"));
    }

    #[tokio::test]
    async fn test_resolver_error_aborts_before_fetch() {
        let client = MockQueryClient::with_results(QueryResult::default(), QueryResult::default());
        let log = MessageLog::new();
        let ctx = RunContext::new(&client, &log);

        let err = run(&ctx, &print_dot()).await.unwrap_err();

        assert!(matches!(err, Error::NoResults { .. }));
        assert_eq!(client.issued_count(QueryApi::Tooling), 0);
    }
}
