//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use refgraph_query::{QueryResult, Row};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the compiled `refgraph` binary.
pub fn refgraph_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_refgraph"))
}

/// Run the refgraph binary in `dir` with extra environment variables.
pub fn run_refgraph_in_dir(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Output {
    Command::new(refgraph_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .envs(envs.iter().copied())
        .output()
        .expect("Failed to execute refgraph")
}

fn row(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// `ApexClass` rows named `names`, with ids `id-<name>`.
pub fn classes(names: &[&str]) -> QueryResult {
    QueryResult::from_rows(
        names
            .iter()
            .map(|name| row(json!({"Id": format!("id-{name}"), "Name": name})))
            .collect(),
    )
}

/// `MetadataComponentDependency` rows from `(source, target)` name pairs.
pub fn dependencies(pairs: &[(&str, &str)]) -> QueryResult {
    QueryResult::from_rows(
        pairs
            .iter()
            .map(|(source, target)| {
                row(json!({
                    "MetadataComponentId": format!("id-{source}"),
                    "MetadataComponentName": source,
                    "MetadataComponentType": "ApexClass",
                    "RefMetadataComponentId": format!("id-{target}"),
                    "RefMetadataComponentName": target,
                    "RefMetadataComponentType": "ApexClass"
                }))
            })
            .collect(),
    )
}

/// Wrap a result set in the envelope `sf data query --json` prints.
pub fn envelope(result: &QueryResult) -> String {
    json!({"status": 0, "result": result, "warnings": []}).to_string()
}

/// Write an executable shell script and return its path.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}

/// A stand-in for Graphviz `dot` that copies its input to the `-o` path.
#[cfg(unix)]
pub fn copying_renderer(dir: &Path) -> PathBuf {
    write_script(dir, "fake-dot", r#"cp "$3" "$5""#)
}
