//! A small typed SOQL builder.
//!
//! Only the subset refgraph needs is modelled: a field list, one object and a
//! conjunction of conditions. Every literal goes through [`quote`], so values
//! coming from the operator (name patterns) or from the platform (ids) cannot
//! break out of their string literal.

use std::fmt;

/// Separator between values of an `IN (...)` list.
pub const IN_SEPARATOR: &str = ",";

/// A single `WHERE` condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `field = 'value'`
    Eq {
        /// Field name.
        field: String,
        /// Unescaped value.
        value: String,
    },
    /// `field LIKE '%needle%'` with `needle` escaped for LIKE.
    Contains {
        /// Field name.
        field: String,
        /// Unescaped substring.
        needle: String,
    },
    /// `field IN ('a','b')`.
    ///
    /// An empty list renders `IN ()`, which the platform rejects. Callers
    /// leave the condition out instead of passing an empty list.
    In {
        /// Field name.
        field: String,
        /// Unescaped values.
        values: Vec<String>,
    },
}

impl Condition {
    /// Build an equality condition.
    pub fn eq(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Eq {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Build a substring (`LIKE '%...%'`) condition.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::Contains {
            field: field.into(),
            needle: needle.into(),
        }
    }

    /// Build an `IN` condition.
    pub fn in_list<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { field, value } => write!(f, "{field} = {}", quote(value)),
            Self::Contains { field, needle } => {
                write!(f, "{field} LIKE '%{}%'", escape_like(needle))
            }
            Self::In { field, values } => {
                let quoted: Vec<String> = values.iter().map(|v| quote(v)).collect();
                write!(f, "{field} IN ({})", quoted.join(IN_SEPARATOR))
            }
        }
    }
}

/// A `SELECT ... FROM ... WHERE ...` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoqlQuery {
    fields: Vec<String>,
    object: String,
    conditions: Vec<Condition>,
}

impl SoqlQuery {
    /// Start a query selecting `fields` from `object`.
    pub fn select<I, S>(fields: I, object: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            object: object.into(),
            conditions: Vec::new(),
        }
    }

    /// Add a condition. Conditions are joined with `AND`.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// The conditions added so far.
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Render the statement.
    pub fn to_soql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SoqlQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.fields.join(", "), self.object)?;
        for (i, condition) in self.conditions.iter().enumerate() {
            let keyword = if i == 0 { "WHERE" } else { "AND" };
            write!(f, " {keyword} {condition}")?;
        }
        Ok(())
    }
}

/// Quote a value as a SOQL string literal.
pub fn quote(value: &str) -> String {
    format!("'{}'", escape_literal(value))
}

/// Escape backslashes and single quotes for use inside a string literal.
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '\'' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape a value for use inside a `LIKE` pattern.
///
/// On top of [`escape_literal`], the wildcards `%` and `_` are escaped so
/// they match literally.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '\'' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            _ => escaped.push(c),
        }
    }
    escaped
}
