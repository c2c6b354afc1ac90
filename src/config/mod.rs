//! Run configuration loading and management
//!
//! Architecture: Anti-Corruption Layer - Configuration translates external YAML into run options
//! - Only run options live here; taxonomies are builtin definitions selected by name
//! - Defaults are embedded in the code, a file only overrides them

use crate::domain::{TaxonError, TaxonResult};
use crate::engine::Selection;
use crate::report::OutputFormat;
use crate::taxonomy::builtin::{BUILTIN_TAXONOMIES, REVIT_CATEGORIES};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Supported configuration format versions
pub const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// File names searched for when no configuration path is given
pub const DEFAULT_CONFIG_FILES: &[&str] = &["taxon.yaml", "taxon.yml", ".taxon.yaml"];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Configuration format version
    pub version: String,
    /// Name of the builtin taxonomy to classify against
    #[serde(default = "default_taxonomy")]
    pub taxonomy: String,
    /// Report only the subtree of this node
    #[serde(default)]
    pub node: Option<String>,
    /// Label written to the report metadata, overriding the one taken from the file name
    #[serde(default)]
    pub label: Option<String>,
    /// Output settings
    #[serde(default)]
    pub output: OutputConfig,
    /// Directory mode settings
    #[serde(default)]
    pub batch: BatchConfig,
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Whether the human format uses colors
    #[serde(default = "default_true")]
    pub colors: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::default(), colors: true }
    }
}

/// Directory mode settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Glob matched against file names inside the data directory
    #[serde(default = "default_batch_pattern")]
    pub pattern: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { pattern: default_batch_pattern() }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TaxonResult<Self> {
        let contents = fs::read_to_string(&path).map_err(|e| {
            TaxonError::config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: Self = serde_yaml::from_str(&contents).map_err(|e| {
            TaxonError::config(format!(
                "Failed to parse config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from string content
    pub fn load_from_str(content: &str) -> TaxonResult<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| TaxonError::config(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Find and load the first default configuration file in `dir`
    pub fn discover<P: AsRef<Path>>(dir: P) -> TaxonResult<Option<Self>> {
        match find_config_file(dir) {
            Some(path) => {
                tracing::debug!("Using configuration {}", path.display());
                Self::load_from_file(path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Default configuration
    pub fn with_defaults() -> Self {
        Self {
            version: "1.0".to_string(),
            taxonomy: default_taxonomy(),
            node: None,
            label: None,
            output: OutputConfig::default(),
            batch: BatchConfig::default(),
        }
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> TaxonResult<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            return Err(TaxonError::config(format!(
                "Unsupported configuration version: {}. Supported versions: {}",
                self.version,
                SUPPORTED_VERSIONS.join(", ")
            )));
        }

        if !BUILTIN_TAXONOMIES.contains(&self.taxonomy.as_str()) {
            return Err(TaxonError::config(format!(
                "Unknown taxonomy '{}'. Available taxonomies: {}",
                self.taxonomy,
                BUILTIN_TAXONOMIES.join(", ")
            )));
        }

        if matches!(self.node.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(TaxonError::config("Node filter must not be empty"));
        }

        glob::Pattern::new(&self.batch.pattern).map_err(|e| {
            TaxonError::config(format!("Invalid batch pattern '{}': {}", self.batch.pattern, e))
        })?;

        Ok(())
    }

    /// Components the report should contain
    pub fn selection(&self) -> Selection {
        Selection::from_filter(self.node.clone())
    }

    /// Serialize back to YAML
    pub fn to_yaml(&self) -> TaxonResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| TaxonError::config(format!("Failed to serialize config: {e}")))
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// First default configuration file present in `dir`
pub fn find_config_file<P: AsRef<Path>>(dir: P) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES.iter().map(|name| dir.as_ref().join(name)).find(|path| path.is_file())
}

fn default_taxonomy() -> String {
    REVIT_CATEGORIES.to_string()
}

fn default_batch_pattern() -> String {
    "*.txt".to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration builder for programmatic construction
pub struct ConfigBuilder {
    config: RunConfig,
}

impl ConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self { config: RunConfig::default() }
    }

    pub fn taxonomy(mut self, name: impl Into<String>) -> Self {
        self.config.taxonomy = name.into();
        self
    }

    pub fn node(mut self, name: impl Into<String>) -> Self {
        self.config.node = Some(name.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = Some(label.into());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.output.format = format;
        self
    }

    pub fn colors(mut self, enabled: bool) -> Self {
        self.config.output.colors = enabled;
        self
    }

    pub fn batch_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.config.batch.pattern = pattern.into();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> TaxonResult<RunConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = RunConfig::default();

        assert!(config.validate().is_ok());
        assert_eq!(config.taxonomy, REVIT_CATEGORIES);
        assert_eq!(config.selection(), Selection::Visible);
        assert_eq!(config.batch.pattern, "*.txt");
    }

    #[test]
    fn test_minimal_yaml_fills_defaults() {
        let config = RunConfig::load_from_str("version: \"1.0\"\n").unwrap();

        assert_eq!(config, RunConfig::default());
    }

    #[test]
    fn test_full_yaml() {
        let yaml = r#"
version: "1.0"
taxonomy: revit-categories
node: Drafting
label: "2022"
output:
  format: human
  colors: false
batch:
  pattern: "bic_*.txt"
"#;
        let config = RunConfig::load_from_str(yaml).unwrap();

        assert_eq!(config.selection(), Selection::Node("Drafting".to_string()));
        assert_eq!(config.label.as_deref(), Some("2022"));
        assert_eq!(config.output.format, OutputFormat::Human);
        assert!(!config.output.colors);
        assert_eq!(config.batch.pattern, "bic_*.txt");
    }

    #[test]
    fn test_validation_failures() {
        assert!(RunConfig::load_from_str("version: \"2.0\"\n").is_err());
        assert!(RunConfig::load_from_str("version: \"1.0\"\ntaxonomy: nope\n").is_err());
        assert!(RunConfig::load_from_str("version: \"1.0\"\nnode: \"  \"\n").is_err());
        assert!(ConfigBuilder::new().batch_pattern("[").build().is_err());
        assert!(RunConfig::load_from_str("version: [").is_err());
    }

    #[test]
    fn test_builder() {
        let config = ConfigBuilder::new()
            .node("Tags")
            .label("2021")
            .format(OutputFormat::Yaml)
            .colors(false)
            .build()
            .unwrap();

        assert_eq!(config.node.as_deref(), Some("Tags"));
        assert_eq!(config.output.format, OutputFormat::Yaml);
    }

    #[test]
    fn test_yaml_round_trip_keeps_settings() {
        let config = ConfigBuilder::new().node("Links").build().unwrap();
        let rehydrated = RunConfig::load_from_str(&config.to_yaml().unwrap()).unwrap();

        assert_eq!(config, rehydrated);
    }

    #[test]
    fn test_discover() -> TaxonResult<()> {
        let temp_dir = TempDir::new()?;
        assert!(RunConfig::discover(temp_dir.path())?.is_none());

        fs::write(temp_dir.path().join("taxon.yml"), "version: \"1.0\"\nnode: Site\n")?;
        let config = RunConfig::discover(temp_dir.path())?.expect("config file present");

        assert_eq!(config.node.as_deref(), Some("Site"));
        Ok(())
    }
}
