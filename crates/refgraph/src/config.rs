//! Optional `refgraph.yaml` configuration.
//!
//! Every section and key is optional; anything missing falls back to the
//! built-in default. Command-line flags are applied on top by the CLI.
//!
//! ```yaml
//! target-org: my-sandbox
//! query:
//!   row-cap: 10000
//!   max-query-length: 100000
//!   max-concurrent-queries: 4
//! components:
//!   target-type: ApexClass
//!   referencing-types: [ApexClass, ApexTrigger]
//! render:
//!   command: dot
//!   format: svg
//!   scratch-file: out.dot
//!   output-file: out.svg
//!   viewer: firefox
//!   open: true
//! edges: keep
//! ```

use crate::domain::ComponentTypes;
use crate::error::{Error, Result};
use crate::fetcher::FetchLimits;
use crate::graph::EdgeMode;
use crate::render::{RenderOptions, Viewer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "refgraph.yaml";

/// Top-level configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RefgraphConfig {
    /// Org alias or username passed to the platform CLI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_org: Option<String>,

    /// Query limits.
    pub query: QueryConfig,

    /// Component types.
    pub components: ComponentsConfig,

    /// Renderer settings.
    pub render: RenderConfig,

    /// Edge multiplicity mode.
    pub edges: EdgeMode,
}

/// `query` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct QueryConfig {
    /// Rows per batch at which truncation is suspected.
    pub row_cap: usize,
    /// Longest SOQL statement per batch.
    pub max_query_length: usize,
    /// Batches in flight at once.
    pub max_concurrent_queries: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let limits = FetchLimits::default();
        Self {
            row_cap: limits.row_cap,
            max_query_length: limits.max_query_length,
            max_concurrent_queries: limits.max_concurrent_queries,
        }
    }
}

/// `components` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ComponentsConfig {
    /// Type of the seed components.
    pub target_type: String,
    /// Types allowed on the referencing side.
    pub referencing_types: Vec<String>,
}

impl Default for ComponentsConfig {
    fn default() -> Self {
        let types = ComponentTypes::default();
        Self {
            target_type: types.target,
            referencing_types: types.referencing,
        }
    }
}

/// `render` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RenderConfig {
    /// Renderer executable.
    pub command: String,
    /// Output format.
    pub format: String,
    /// Scratch DOT file.
    pub scratch_file: PathBuf,
    /// Rendered image.
    pub output_file: PathBuf,
    /// Viewer program; the system default when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer: Option<String>,
    /// Whether to open the image at all.
    pub open: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            command: options.renderer,
            format: options.format,
            scratch_file: options.scratch_path,
            output_file: options.output_path,
            viewer: None,
            open: true,
        }
    }
}

impl RefgraphConfig {
    /// Parse configuration from YAML text.
    ///
    /// Blank text gives the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the YAML is malformed, names an unknown
    /// key, or fails [`validate`](Self::validate).
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the file cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            Error::Config(format!("cannot read '{}': {e}", path.display()))
        })?;
        Self::from_yaml(&content)
    }

    /// Load `refgraph.yaml` from `dir` if it exists, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file's existence cannot be checked, and
    /// the errors of [`load`](Self::load) if it exists.
    pub async fn discover(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if fs::try_exists(&path).await? {
            tracing::debug!(path = %path.display(), "Loading configuration");
            Self::load(&path).await
        } else {
            tracing::debug!("No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Save configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if serialization fails and `Error::Io` if
    /// the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` naming the first offending key: a zero
    /// limit, an empty component type, or an empty renderer command.
    pub fn validate(&self) -> Result<()> {
        if self.query.row_cap == 0 {
            return Err(Error::Config("query.row-cap must be greater than 0".into()));
        }
        if self.query.max_query_length == 0 {
            return Err(Error::Config(
                "query.max-query-length must be greater than 0".into(),
            ));
        }
        if self.query.max_concurrent_queries == 0 {
            return Err(Error::Config(
                "query.max-concurrent-queries must be greater than 0".into(),
            ));
        }
        if self.components.target_type.trim().is_empty() {
            return Err(Error::Config("components.target-type cannot be empty".into()));
        }
        if self.components.referencing_types.is_empty()
            || self
                .components
                .referencing_types
                .iter()
                .any(|t| t.trim().is_empty())
        {
            return Err(Error::Config(
                "components.referencing-types must list at least one non-empty type".into(),
            ));
        }
        if self.render.command.trim().is_empty() {
            return Err(Error::Config("render.command cannot be empty".into()));
        }
        Ok(())
    }

    /// Fetch limits from the `query` section.
    pub fn fetch_limits(&self) -> FetchLimits {
        FetchLimits {
            row_cap: self.query.row_cap,
            max_query_length: self.query.max_query_length,
            max_concurrent_queries: self.query.max_concurrent_queries,
        }
    }

    /// Component types from the `components` section.
    pub fn component_types(&self) -> ComponentTypes {
        ComponentTypes {
            target: self.components.target_type.clone(),
            referencing: self.components.referencing_types.clone(),
        }
    }

    /// Render options from the `render` section, using `algorithm` as the
    /// layout engine.
    pub fn render_options(&self, algorithm: &str) -> RenderOptions {
        let viewer = match (&self.render.viewer, self.render.open) {
            (_, false) => Viewer::Disabled,
            (Some(program), true) => Viewer::Command(program.clone()),
            (None, true) => Viewer::SystemDefault,
        };
        RenderOptions {
            renderer: self.render.command.clone(),
            algorithm: algorithm.to_string(),
            format: self.render.format.clone(),
            scratch_path: self.render.scratch_file.clone(),
            output_path: self.render.output_file.clone(),
            viewer,
        }
    }
}
