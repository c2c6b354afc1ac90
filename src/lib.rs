//! Category Taxon - hierarchical classification of flat identifier sets
//!
//! Architecture: Clean Architecture - Library interface serves as the application layer
//! - Taxonomies are immutable forests of pattern-bearing nodes
//! - Every classification run owns its state, so one taxonomy serves many runs
//! - Reports are produced from component collections, never from engine state

pub mod assembler;
pub mod batch;
pub mod config;
pub mod domain;
pub mod engine;
pub mod patterns;
pub mod pool;
pub mod report;
pub mod taxonomy;

// Re-export main types for convenient access
pub use domain::{
    Categories, CollectionMeta, Component, ComponentCollection, TaxonError, TaxonResult,
    OWN_BUCKET,
};

pub use config::{ConfigBuilder, RunConfig};

pub use engine::{Classification, ClassificationEngine, Ownership, Selection, TraversalContext};

pub use assembler::ComponentAssembler;

pub use batch::{BatchOptions, BatchSummary};

pub use pool::IdentifierPool;

pub use report::{OutputFormat, ReportFormatter, ReportOptions};

pub use taxonomy::{NodeDef, NodeId, Taxonomy, TaxonomyNode, TaxonomyStats};

use std::path::Path;

/// Version written to a collection when neither the caller nor the listing provides one
pub const DEFAULT_LABEL: &str = "unversioned";

/// Main classifier providing high-level classification operations
#[derive(Debug, Clone)]
pub struct TaxonClassifier {
    taxonomy: Taxonomy,
    report_formatter: ReportFormatter,
}

/// Options for a single classification
#[derive(Debug, Clone, Default)]
pub struct ClassifyOptions {
    /// Version written to the metadata, overriding the listing's own label
    pub label: Option<String>,
    /// Components the collection contains
    pub selection: Selection,
}

impl ClassifyOptions {
    /// Options carried by a run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        Self { label: config.label.clone(), selection: config.selection() }
    }
}

impl TaxonClassifier {
    /// Create a classifier for the given taxonomy
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy, report_formatter: ReportFormatter::default() }
    }

    /// Create a classifier for a builtin taxonomy
    pub fn builtin(name: &str) -> TaxonResult<Self> {
        Ok(Self::new(taxonomy::builtin::builtin(name)?))
    }

    /// Create a classifier from a run configuration
    pub fn from_config(config: &RunConfig) -> TaxonResult<Self> {
        config.validate()?;
        let formatter = ReportFormatter::new(ReportOptions {
            use_colors: config.output.colors,
            ..Default::default()
        });
        Ok(Self::builtin(&config.taxonomy)?.with_report_formatter(formatter))
    }

    /// Create a classifier loading configuration from file
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> TaxonResult<Self> {
        Self::from_config(&RunConfig::load_from_file(path)?)
    }

    /// Set custom report formatter
    pub fn with_report_formatter(mut self, formatter: ReportFormatter) -> Self {
        self.report_formatter = formatter;
        self
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Engine bound to this classifier's taxonomy
    pub fn engine(&self) -> ClassificationEngine<'_> {
        ClassificationEngine::new(&self.taxonomy)
    }

    /// Classify a pool and collect the selected components
    pub fn classify(
        &self,
        pool: &IdentifierPool,
        options: &ClassifyOptions,
    ) -> TaxonResult<ComponentCollection> {
        let classification = self.engine().classify(pool.iter())?;
        let version = options.label.as_deref().or(pool.label()).unwrap_or(DEFAULT_LABEL);
        Ok(classification.collect(version, &options.selection))
    }

    /// Classify a single listing file
    pub fn classify_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &ClassifyOptions,
    ) -> TaxonResult<ComponentCollection> {
        let pool = IdentifierPool::load_from_file(path)?;
        self.classify(&pool, options)
    }

    /// Classify every listing of a directory, writing a JSON report next to each
    pub fn classify_directory<P: AsRef<Path>>(
        &self,
        dir: P,
        options: &BatchOptions,
    ) -> TaxonResult<BatchSummary> {
        batch::run_batch(self, dir, options)
    }

    /// Format a collection for output
    pub fn format_collection(
        &self,
        collection: &ComponentCollection,
        format: OutputFormat,
    ) -> TaxonResult<String> {
        self.report_formatter.format_collection(collection, format)
    }
}

/// Convenience function to create a classifier for the default builtin taxonomy
pub fn create_classifier() -> TaxonResult<TaxonClassifier> {
    TaxonClassifier::from_config(&RunConfig::default())
}

/// Convenience function to classify identifiers against a taxonomy
pub fn classify_identifiers<I, S>(
    taxonomy: &Taxonomy,
    identifiers: I,
    version: &str,
    selection: &Selection,
) -> TaxonResult<ComponentCollection>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Ok(ClassificationEngine::new(taxonomy).classify(identifiers)?.collect(version, selection))
}
