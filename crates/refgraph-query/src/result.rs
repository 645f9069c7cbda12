//! Query result sets.

use crate::error::{QueryError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A raw row as returned by the platform.
pub type Row = Map<String, Value>;

/// One bounded result set.
///
/// `total_size` is the platform's count of matching rows, which may be larger
/// than `records.len()` when the result was capped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Number of rows matching the query.
    pub total_size: usize,

    /// Whether the platform returned every matching row.
    #[serde(default = "default_done")]
    pub done: bool,

    /// The returned rows.
    #[serde(default)]
    pub records: Vec<Row>,
}

fn default_done() -> bool {
    true
}

impl QueryResult {
    /// Build a complete result set from rows.
    pub fn from_rows(records: Vec<Row>) -> Self {
        Self {
            total_size: records.len(),
            done: true,
            records,
        }
    }

    /// Number of rows actually returned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no rows were returned and none were reported.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.total_size == 0
    }

    /// Returns `true` if this result set may have been cut off at `row_cap`.
    ///
    /// Both the returned row count and the reported total are checked, since
    /// clients differ in which of the two they report faithfully.
    #[must_use]
    pub fn reaches_cap(&self, row_cap: usize) -> bool {
        self.records.len() >= row_cap || self.total_size >= row_cap
    }

    /// Decode every row into `T`.
    ///
    /// Unknown fields (such as the platform's `attributes` object) are
    /// ignored by the target type; missing required fields fail with
    /// [`QueryError::MalformedRecord`] naming the offending row.
    ///
    /// # Errors
    ///
    /// Returns the first row that does not decode.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .enumerate()
            .map(|(index, row)| {
                serde_json::from_value(Value::Object(row.clone()))
                    .map_err(|source| QueryError::MalformedRecord { index, source })
            })
            .collect()
    }
}
