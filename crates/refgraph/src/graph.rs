//! Aggregation of dependency edges into a directed graph.
//!
//! The graph is an ordered adjacency list keyed by component name:
//!
//! - keys appear in first-seen order of their source name
//! - each key's targets appear in first-seen order of their edges
//! - edges point from the referencing component to the referenced one
//!
//! Nodes are implicit. A component only exists in the graph as the endpoint of
//! some edge.
//!
//! # Parallel edges
//!
//! The platform reports one record per reference, so the same pair can show
//! up several times. [`EdgeMode`] decides what happens to repeats:
//!
//! - `Keep` (default): every record becomes its own edge
//! - `Dedupe`: repeats are dropped, the first occurrence keeps its position
//! - `Count`: repeats collapse into the first occurrence, which counts them

use crate::domain::DependencyEdge;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// What to do with repeated (source, target) pairs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
    /// Keep every record as a separate edge.
    #[default]
    Keep,
    /// Keep only the first edge of each pair.
    Dedupe,
    /// Collapse each pair into one edge carrying its multiplicity.
    Count,
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keep => write!(f, "keep"),
            Self::Dedupe => write!(f, "dedupe"),
            Self::Count => write!(f, "count"),
        }
    }
}

/// One entry of a source's adjacency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Name of the referenced component.
    pub name: String,
    /// How many records this entry stands for. Always 1 unless the graph was
    /// built with [`EdgeMode::Count`].
    pub multiplicity: usize,
}

/// Directed dependency graph keyed by component name.
///
/// Built once by [`build_graph`] and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    entries: Vec<(String, Vec<Target>)>,
    positions: HashMap<String, usize>,
}

impl DependencyGraph {
    /// Iterate over `(source, targets)` in key order.
    pub fn adjacency(&self) -> impl Iterator<Item = (&str, &[Target])> {
        self.entries
            .iter()
            .map(|(source, targets)| (source.as_str(), targets.as_slice()))
    }

    /// Source names in key order.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(source, _)| source.as_str())
    }

    /// The adjacency list of `source`, if it has any outgoing edge.
    pub fn targets(&self, source: &str) -> Option<&[Target]> {
        self.positions
            .get(source)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// Target names of `source`, in list order. Empty if `source` is not a key.
    pub fn target_names(&self, source: &str) -> Vec<&str> {
        self.targets(source)
            .map(|targets| targets.iter().map(|t| t.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Number of adjacency entries, i.e. edge statements when serialized.
    pub fn edge_count(&self) -> usize {
        self.entries.iter().map(|(_, targets)| targets.len()).sum()
    }

    /// Number of dependency records the graph was built from.
    pub fn reference_count(&self) -> usize {
        self.entries
            .iter()
            .flat_map(|(_, targets)| targets)
            .map(|t| t.multiplicity)
            .sum()
    }

    /// Returns `true` if the graph has no edges.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Node and cycle statistics.
    ///
    /// A cycle is a strongly connected component with more than one member,
    /// or a single component that references itself.
    pub fn stats(&self) -> GraphStats {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

        for (source, targets) in self.adjacency() {
            let from = *nodes
                .entry(source)
                .or_insert_with(|| graph.add_node(source));
            for target in targets {
                let name = target.name.as_str();
                let to = *nodes.entry(name).or_insert_with(|| graph.add_node(name));
                graph.update_edge(from, to, ());
            }
        }

        let mut cycles = 0;
        let mut components_in_cycles = 0;
        for scc in algo::tarjan_scc(&graph) {
            let cyclic = scc.len() > 1 || graph.contains_edge(scc[0], scc[0]);
            if cyclic {
                cycles += 1;
                components_in_cycles += scc.len();
            }
        }

        GraphStats {
            nodes: graph.node_count(),
            edges: self.edge_count(),
            references: self.reference_count(),
            cycles,
            components_in_cycles,
        }
    }

    fn push(&mut self, source: &str, target: &str, mode: EdgeMode) {
        let position = match self.positions.get(source) {
            Some(&i) => i,
            None => {
                self.entries.push((source.to_string(), Vec::new()));
                self.positions
                    .insert(source.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        let targets = &mut self.entries[position].1;

        if mode != EdgeMode::Keep {
            if let Some(existing) = targets.iter_mut().find(|t| t.name == target) {
                if mode == EdgeMode::Count {
                    existing.multiplicity += 1;
                }
                return;
            }
        }

        targets.push(Target {
            name: target.to_string(),
            multiplicity: 1,
        });
    }
}

/// Summary numbers for a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    /// Distinct component names.
    pub nodes: usize,
    /// Edge statements.
    pub edges: usize,
    /// Dependency records represented.
    pub references: usize,
    /// Dependency cycles.
    pub cycles: usize,
    /// Components that sit on some cycle.
    pub components_in_cycles: usize,
}

/// Fold edge records into a [`DependencyGraph`].
///
/// Deterministic: the same edge sequence always produces the same key order
/// and the same per-key list order.
pub fn build_graph(edges: &[DependencyEdge], mode: EdgeMode) -> DependencyGraph {
    let mut graph = DependencyGraph::default();
    for edge in edges {
        graph.push(&edge.source_name, &edge.target_name, mode);
    }
    tracing::debug!(
        records = edges.len(),
        sources = graph.entries.len(),
        edges = graph.edge_count(),
        %mode,
        "Built dependency graph"
    );
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn edges(pairs: &[(&str, &str)]) -> Vec<DependencyEdge> {
        pairs
            .iter()
            .map(|(s, t)| DependencyEdge::between(s, t))
            .collect()
    }

    fn as_lists(graph: &DependencyGraph) -> Vec<(String, Vec<String>)> {
        graph
            .adjacency()
            .map(|(s, ts)| (s.to_string(), ts.iter().map(|t| t.name.clone()).collect()))
            .collect()
    }

    #[test]
    fn test_single_edge() {
        let graph = build_graph(&edges(&[("Bar", "Foo")]), EdgeMode::Keep);
        assert_eq!(
            as_lists(&graph),
            vec![("Bar".to_string(), vec!["Foo".to_string()])]
        );
    }

    #[test]
    fn test_targets_keep_input_order() {
        let graph = build_graph(&edges(&[("Bar", "Foo"), ("Bar", "Baz")]), EdgeMode::Keep);
        assert_eq!(graph.target_names("Bar"), vec!["Foo", "Baz"]);
    }

    #[test]
    fn test_keys_follow_first_occurrence() {
        let graph = build_graph(
            &edges(&[("B", "X"), ("A", "X"), ("B", "Y"), ("C", "A")]),
            EdgeMode::Keep,
        );
        assert_eq!(graph.sources().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(graph.target_names("B"), vec!["X", "Y"]);
    }

    #[test]
    fn test_target_only_component_is_not_a_key() {
        let graph = build_graph(&edges(&[("Bar", "Foo")]), EdgeMode::Keep);
        assert!(graph.targets("Foo").is_none());
        assert!(graph.target_names("Foo").is_empty());
    }

    #[rstest]
    #[case::keep(EdgeMode::Keep, vec!["Foo", "Baz", "Foo"], vec![1, 1, 1])]
    #[case::dedupe(EdgeMode::Dedupe, vec!["Foo", "Baz"], vec![1, 1])]
    #[case::count(EdgeMode::Count, vec!["Foo", "Baz"], vec![2, 1])]
    fn test_parallel_edges_by_mode(
        #[case] mode: EdgeMode,
        #[case] expected_names: Vec<&str>,
        #[case] expected_multiplicity: Vec<usize>,
    ) {
        let graph = build_graph(
            &edges(&[("Bar", "Foo"), ("Bar", "Baz"), ("Bar", "Foo")]),
            mode,
        );
        let targets = graph.targets("Bar").unwrap();
        assert_eq!(graph.target_names("Bar"), expected_names);
        assert_eq!(
            targets.iter().map(|t| t.multiplicity).collect::<Vec<_>>(),
            expected_multiplicity
        );
    }

    #[test]
    fn test_count_mode_preserves_reference_count() {
        let input = edges(&[("A", "B"), ("A", "B"), ("A", "C"), ("D", "B")]);
        let graph = build_graph(&input, EdgeMode::Count);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.reference_count(), input.len());
    }

    #[test]
    fn test_empty_input() {
        let graph = build_graph(&[], EdgeMode::Keep);
        assert!(graph.is_empty());
        assert_eq!(graph.stats(), GraphStats::default());
    }

    #[test]
    fn test_stats_counts_cycles() {
        // A <-> B is one cycle, C references itself, D -> A is acyclic.
        let graph = build_graph(
            &edges(&[("A", "B"), ("B", "A"), ("C", "C"), ("D", "A"), ("A", "B")]),
            EdgeMode::Keep,
        );
        let stats = graph.stats();
        assert_eq!(stats.nodes, 4);
        assert_eq!(stats.edges, 5);
        assert_eq!(stats.references, 5);
        assert_eq!(stats.cycles, 2);
        assert_eq!(stats.components_in_cycles, 3);
    }

    #[test]
    fn test_edge_mode_deserializes_lowercase() {
        let mode: EdgeMode = serde_yaml::from_str("count").unwrap();
        assert_eq!(mode, EdgeMode::Count);
    }

    fn arb_edges() -> impl Strategy<Value = Vec<DependencyEdge>> {
        prop::collection::vec(("[A-E]", "[A-E]"), 0..40).prop_map(|pairs| {
            pairs
                .iter()
                .map(|(s, t)| DependencyEdge::between(s, t))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_build_is_deterministic(input in arb_edges()) {
            let first = build_graph(&input, EdgeMode::Keep);
            let second = build_graph(&input, EdgeMode::Keep);
            prop_assert_eq!(as_lists(&first), as_lists(&second));
        }

        #[test]
        fn prop_no_edge_is_dropped(input in arb_edges()) {
            let graph = build_graph(&input, EdgeMode::Keep);
            prop_assert_eq!(graph.edge_count(), input.len());
            for edge in &input {
                prop_assert!(graph.targets(&edge.source_name).is_some());
                prop_assert!(graph
                    .adjacency()
                    .any(|(_, targets)| targets.iter().any(|t| t.name == edge.target_name)));
            }
        }

        #[test]
        fn prop_dedupe_leaves_unique_pairs(input in arb_edges()) {
            let graph = build_graph(&input, EdgeMode::Dedupe);
            for (_, targets) in graph.adjacency() {
                let mut names: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
                let before = names.len();
                names.sort_unstable();
                names.dedup();
                prop_assert_eq!(before, names.len());
            }
        }
    }
}
