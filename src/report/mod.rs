//! Report generation with multiple output formats
//!
//! Architecture: Anti-Corruption Layer - Formatters translate collections to external formats
//! - JSON is the interchange format read by the category selector manifest tooling
//! - The human format renders the component tree for terminals

use crate::domain::{Categories, ComponentCollection, TaxonError, TaxonResult};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io::Write;

/// Supported output formats for collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON, two-space indent
    #[default]
    Json,
    /// YAML document
    Yaml,
    /// Indented component tree with counts
    Human,
}

impl OutputFormat {
    /// Parse format from its name
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            "human" => Some(Self::Human),
            _ => None,
        }
    }

    /// Get all available format names
    pub fn all_formats() -> &'static [&'static str] {
        &["json", "yaml", "human"]
    }
}

/// Options for customizing report output
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Whether to use colored output (for human format)
    pub use_colors: bool,
    /// Whether to list unclassified identifiers (for human format)
    pub show_excluded: bool,
    /// Whether to print nodes that classified nothing (for human format)
    pub show_empty: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self { use_colors: true, show_excluded: true, show_empty: false }
    }
}

/// Main report formatter that dispatches to specific formatters
#[derive(Debug, Clone, Default)]
pub struct ReportFormatter {
    options: ReportOptions,
}

impl ReportFormatter {
    /// Create a new report formatter with options
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Format a collection in the specified format
    pub fn format_collection(
        &self,
        collection: &ComponentCollection,
        format: OutputFormat,
    ) -> TaxonResult<String> {
        match format {
            OutputFormat::Json => self.format_json(collection),
            OutputFormat::Yaml => self.format_yaml(collection),
            OutputFormat::Human => Ok(self.format_human(collection)),
        }
    }

    /// Write a formatted collection to a writer
    pub fn write_collection<W: Write>(
        &self,
        collection: &ComponentCollection,
        format: OutputFormat,
        mut writer: W,
    ) -> TaxonResult<()> {
        let formatted = self.format_collection(collection, format)?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    fn format_json(&self, collection: &ComponentCollection) -> TaxonResult<String> {
        serde_json::to_string_pretty(collection)
            .map_err(|e| TaxonError::serialization(format!("JSON serialization failed: {e}")))
    }

    fn format_yaml(&self, collection: &ComponentCollection) -> TaxonResult<String> {
        serde_yaml::to_string(collection)
            .map_err(|e| TaxonError::serialization(format!("YAML serialization failed: {e}")))
    }

    fn format_human(&self, collection: &ComponentCollection) -> String {
        let mut output = String::new();

        if collection.components.is_empty() {
            output.push_str("No components selected\n");
        }
        for component in &collection.components {
            self.write_node(&mut output, &component.name, &component.categories, 0);
        }

        let meta = &collection.meta;
        if self.options.show_excluded && !meta.excluded.is_empty() {
            let header = format!("Unclassified ({})", meta.excluded.len());
            output.push('\n');
            output.push_str(&self.paint(&header, Paint::Warning));
            output.push('\n');
            for identifier in &meta.excluded {
                let _ = writeln!(output, "  - {identifier}");
            }
        }

        let summary = format!(
            "Summary: {} of {} identifiers classified, {} unclassified (version {})",
            meta.included,
            meta.total,
            meta.excluded.len(),
            meta.version
        );
        output.push('\n');
        output.push_str(&self.paint(&summary, Paint::Strong));
        output.push('\n');
        output
    }

    fn write_node(&self, output: &mut String, name: &str, categories: &Categories, depth: usize) {
        let indent = "  ".repeat(depth);
        let count = format!("({})", categories.len());
        let _ = writeln!(
            output,
            "{indent}{} {}",
            self.paint(name, Paint::Strong),
            self.paint(&count, Paint::Dim)
        );

        for identifier in &categories.own {
            let _ = writeln!(output, "{indent}  - {identifier}");
        }

        for child in &categories.children {
            if self.options.show_empty || !child.categories.is_empty() {
                self.write_node(output, &child.name, &child.categories, depth + 1);
            }
        }
    }

    fn paint(&self, text: &str, paint: Paint) -> String {
        if !self.options.use_colors {
            return text.to_string();
        }
        match paint {
            Paint::Strong => text.bold().to_string(),
            Paint::Dim => text.dimmed().to_string(),
            Paint::Warning => text.yellow().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Paint {
    Strong,
    Dim,
    Warning,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Component;
    use serde_json::Value as JsonValue;
    use std::collections::BTreeSet;

    fn create_test_collection() -> ComponentCollection {
        let pool: BTreeSet<String> = ["OST_SiteProperty", "OST_Topography", "OST_Mystery"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let used: BTreeSet<String> =
            ["OST_SiteProperty", "OST_Topography"].iter().map(|s| s.to_string()).collect();

        let topography = Component::new(
            "Topography",
            Categories::new(vec!["OST_Topography".to_string()], Vec::new()),
        );
        let empty = Component::new("Pads", Categories::default());
        let site = Component::new(
            "Site",
            Categories::new(vec!["OST_SiteProperty".to_string()], vec![topography, empty]),
        );

        ComponentCollection::build("2021", &pool, &used, vec![site])
    }

    fn plain() -> ReportFormatter {
        ReportFormatter::new(ReportOptions { use_colors: false, ..Default::default() })
    }

    #[test]
    fn test_json_format() {
        let output = plain()
            .format_collection(&create_test_collection(), OutputFormat::Json)
            .unwrap();

        let json: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(json["meta"]["version"], "2021");
        assert_eq!(json["meta"]["total"], 3);
        assert_eq!(json["meta"]["included"], 2);
        assert_eq!(json["meta"]["excluded"], serde_json::json!(["OST_Mystery"]));
        assert_eq!(json["components"][0]["name"], "Site");
        assert_eq!(
            json["components"][0]["categories"]["Topography"]["_"],
            serde_json::json!(["OST_Topography"])
        );
        // Two-space indentation
        assert!(output.contains("\n  \"meta\""));
    }

    #[test]
    fn test_yaml_format() {
        let output = plain()
            .format_collection(&create_test_collection(), OutputFormat::Yaml)
            .unwrap();

        let yaml: serde_yaml::Value = serde_yaml::from_str(&output).unwrap();
        assert_eq!(yaml["meta"]["total"].as_u64(), Some(3));
        assert_eq!(yaml["components"][0]["name"].as_str(), Some("Site"));
        assert!(yaml["components"][0]["categories"]["_"].is_sequence());
    }

    #[test]
    fn test_human_format() {
        let output = plain()
            .format_collection(&create_test_collection(), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("Site (2)"));
        assert!(output.contains("  Topography (1)"));
        assert!(output.contains("    - OST_Topography"));
        assert!(!output.contains("Pads"));
        assert!(output.contains("Unclassified (1)"));
        assert!(output
            .contains("Summary: 2 of 3 identifiers classified, 1 unclassified (version 2021)"));
    }

    #[test]
    fn test_human_format_options() {
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: false,
            show_excluded: false,
            show_empty: true,
        });

        let output = formatter
            .format_collection(&create_test_collection(), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("Pads (0)"));
        assert!(!output.contains("Unclassified"));
    }

    #[test]
    fn test_empty_collection() {
        let output = plain()
            .format_collection(&ComponentCollection::default(), OutputFormat::Human)
            .unwrap();

        assert!(output.contains("No components selected"));
    }

    #[test]
    fn test_write_collection() {
        let mut buffer = Vec::new();
        plain()
            .write_collection(&create_test_collection(), OutputFormat::Json, &mut buffer)
            .unwrap();

        let json: JsonValue = serde_json::from_slice(&buffer).unwrap();
        assert!(json["components"].is_array());
    }

    #[test]
    fn test_format_names() {
        assert_eq!(OutputFormat::from_name("JSON"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::from_name("yml"), Some(OutputFormat::Yaml));
        assert_eq!(OutputFormat::from_name("sarif"), None);
        assert_eq!(OutputFormat::all_formats().len(), 3);
    }
}
