//! DOT serialization of a [`DependencyGraph`].
//!
//! Output is one `digraph` with one edge statement per adjacency entry, in
//! adjacency order. No node statements are written, so components only show
//! up as edge endpoints.

use crate::graph::DependencyGraph;
use std::borrow::Cow;
use std::fmt::Write;

/// Name of the emitted `digraph`.
pub const GRAPH_NAME: &str = "G";

/// DOT keywords, which are only usable as IDs when quoted.
const KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

/// Serialize `graph` as DOT text.
///
/// Parallel edges are written as they are; when the graph was built with
/// [`EdgeMode::Count`](crate::graph::EdgeMode::Count), an entry standing for
/// more than one reference carries its count as label and weight.
pub fn to_dot(graph: &DependencyGraph) -> String {
    let mut output = String::with_capacity(64 + graph.edge_count() * 32);
    let _ = writeln!(output, "digraph {GRAPH_NAME} {{");
    for (source, targets) in graph.adjacency() {
        let from = dot_id(source);
        for target in targets {
            let to = dot_id(&target.name);
            if target.multiplicity > 1 {
                let _ = writeln!(
                    output,
                    "  {from} -> {to} [label=\"{n}\", weight={n}];",
                    n = target.multiplicity
                );
            } else {
                let _ = writeln!(output, "  {from} -> {to};");
            }
        }
    }
    output.push_str("}\n");
    output
}

/// Render `name` as a DOT ID, quoting it unless it is a plain identifier or
/// a numeral.
pub fn dot_id(name: &str) -> Cow<'_, str> {
    if is_plain_id(name) || is_numeral(name) {
        Cow::Borrowed(name)
    } else {
        Cow::Owned(format!("\"{}\"", escape(name)))
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`, excluding keywords (case-insensitive).
fn is_plain_id(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// `-?(\.[0-9]+|[0-9]+(\.[0-9]*)?)`
fn is_numeral(name: &str) -> bool {
    let digits = name.strip_prefix('-').unwrap_or(name);
    let (int, frac) = match digits.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (digits, None),
    };
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    match frac {
        None => !int.is_empty() && all_digits(int),
        Some(frac) => {
            all_digits(int) && all_digits(frac) && !(int.is_empty() && frac.is_empty())
        }
    }
}

/// Escape characters that would end or corrupt a quoted ID.
fn escape(name: &str) -> String {
    name.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
