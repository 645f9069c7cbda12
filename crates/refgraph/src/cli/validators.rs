//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::render::LAYOUT_ENGINES;

/// Validate a Graphviz layout engine name.
pub fn validate_algorithm(s: &str) -> Result<String, String> {
    let s = s.trim();
    if LAYOUT_ENGINES.contains(&s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "Unknown layout algorithm '{s}'. Expected one of: {}",
            LAYOUT_ENGINES.join(", ")
        ))
    }
}

/// Validate a renderer output format such as `svg` or `png`.
///
/// The renderer decides which formats it supports; this only rejects values
/// that cannot be a format name (and would corrupt the `-T` argument).
pub fn validate_format(s: &str) -> Result<String, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Output format cannot be empty".to_string());
    }
    if !s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ':' || c == '_')
    {
        return Err(format!(
            "Invalid output format '{s}': only letters, digits, ':' and '_' are allowed"
        ));
    }
    Ok(s.to_string())
}
