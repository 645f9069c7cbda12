//! Domain types for dependency extraction.
//!
//! Records are decoded straight from query rows, so the serde field names
//! follow the platform's column names.

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Component type whose dependents are graphed by default.
pub const DEFAULT_TARGET_TYPE: &str = "ApexClass";

/// Component types allowed as the referencing side of an edge by default.
pub const DEFAULT_REFERENCING_TYPES: [&str; 2] = ["ApexClass", "ApexTrigger"];

/// Opaque, stable identifier of a component (an 18 character record id on
/// the platform, but nothing here depends on that).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(pub String);

impl ComponentId {
    /// Create a new component ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The seed components whose dependents are fetched.
///
/// Ordered so that batching over it is deterministic.
pub type SeedSet = BTreeSet<ComponentId>;

/// A named component of the org.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Component {
    /// Record id
    #[serde(rename = "Id")]
    pub id: ComponentId,

    /// Display name, used as the graph node key
    #[serde(rename = "Name")]
    pub name: String,
}

/// One "source references target" record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencyEdge {
    /// Id of the referencing component
    #[serde(rename = "MetadataComponentId")]
    pub source_id: ComponentId,

    /// Name of the referencing component
    #[serde(rename = "MetadataComponentName")]
    pub source_name: String,

    /// Type of the referencing component
    #[serde(rename = "MetadataComponentType")]
    pub source_type: String,

    /// Id of the referenced component
    #[serde(rename = "RefMetadataComponentId")]
    pub target_id: ComponentId,

    /// Name of the referenced component
    #[serde(rename = "RefMetadataComponentName")]
    pub target_name: String,

    /// Type of the referenced component
    #[serde(rename = "RefMetadataComponentType")]
    pub target_type: String,
}

impl DependencyEdge {
    /// Build an edge between two named components of the default types.
    ///
    /// Ids are derived from the names; handy for fixtures.
    pub fn between(source: &str, target: &str) -> Self {
        Self {
            source_id: ComponentId::new(format!("id-{source}")),
            source_name: source.to_string(),
            source_type: DEFAULT_TARGET_TYPE.to_string(),
            target_id: ComponentId::new(format!("id-{target}")),
            target_name: target.to_string(),
            target_type: DEFAULT_TARGET_TYPE.to_string(),
        }
    }
}

/// Which component types take part in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentTypes {
    /// Type of the seed components (the referenced side).
    pub target: String,
    /// Allowed types of the referencing side.
    pub referencing: Vec<String>,
}

impl Default for ComponentTypes {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET_TYPE.to_string(),
            referencing: DEFAULT_REFERENCING_TYPES
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}
