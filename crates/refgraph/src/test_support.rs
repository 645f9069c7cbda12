//! Row builders shared by unit tests.

use refgraph_query::{QueryResult, Row};
use serde_json::{json, Value};

/// Turn a JSON object literal into a [`Row`].
pub(crate) fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// `ApexClass` rows from `(id, name)` pairs.
pub(crate) fn class_rows(classes: &[(&str, &str)]) -> QueryResult {
    QueryResult::from_rows(
        classes
            .iter()
            .map(|(id, name)| {
                row(json!({
                    "attributes": {"type": "ApexClass"},
                    "Id": id,
                    "Name": name
                }))
            })
            .collect(),
    )
}

/// `MetadataComponentDependency` rows from `(source, target)` name pairs.
///
/// Ids are derived from the names the same way as
/// [`DependencyEdge::between`](crate::domain::DependencyEdge::between).
pub(crate) fn dependency_rows(pairs: &[(&str, &str)]) -> QueryResult {
    QueryResult::from_rows(
        pairs
            .iter()
            .map(|(source, target)| dependency_row(source, target))
            .collect(),
    )
}

/// One `MetadataComponentDependency` row.
pub(crate) fn dependency_row(source: &str, target: &str) -> Row {
    row(json!({
        "attributes": {"type": "MetadataComponentDependency"},
        "MetadataComponentId": format!("id-{source}"),
        "MetadataComponentName": source,
        "MetadataComponentType": "ApexClass",
        "RefMetadataComponentId": format!("id-{target}"),
        "RefMetadataComponentName": target,
        "RefMetadataComponentType": "ApexClass"
    }))
}
