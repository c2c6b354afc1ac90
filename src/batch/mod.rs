//! Directory mode: classify every identifier listing of a data directory
//!
//! Each listing `<name>.txt` produces `<name>.json` next to it. Listings are
//! independent runs against the same taxonomy, so they can be processed in
//! parallel; every run owns its classification state.

use crate::domain::{TaxonError, TaxonResult};
use crate::engine::Selection;
use crate::report::OutputFormat;
use crate::{ClassifyOptions, TaxonClassifier};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for directory mode
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Glob matched against file names
    pub pattern: String,
    /// Whether to use parallel processing
    pub parallel: bool,
    /// Whether to stop at the first failing listing
    pub fail_fast: bool,
    /// Components written for every listing
    pub selection: Selection,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            pattern: "*.txt".to_string(),
            parallel: true,
            fail_fast: false,
            selection: Selection::Visible,
        }
    }
}

/// A listing that was classified and written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub output: PathBuf,
    pub total: usize,
    pub included: usize,
}

/// Outcome of a directory run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// Listings written, in file name order
    pub written: Vec<BatchEntry>,
    /// Listings that failed, with the error message
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// One line per listing
    pub fn format_display(&self) -> String {
        let mut lines: Vec<String> = self
            .written
            .iter()
            .map(|entry| {
                format!(
                    "{} -> {} ({} of {} classified)",
                    entry.source.display(),
                    entry.output.display(),
                    entry.included,
                    entry.total
                )
            })
            .collect();
        lines.extend(
            self.failed
                .iter()
                .map(|(source, error)| format!("{} failed: {}", source.display(), error)),
        );
        lines.join("\n")
    }
}

/// Listings in `dir` (not recursive) whose file name matches `pattern`, sorted by name
pub fn discover_listings<P: AsRef<Path>>(dir: P, pattern: &str) -> TaxonResult<Vec<PathBuf>> {
    let matcher = glob::Pattern::new(pattern)
        .map_err(|e| TaxonError::config(format!("Invalid batch pattern '{pattern}': {e}")))?;

    let mut listings = Vec::new();
    for entry in WalkDir::new(dir.as_ref()).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            TaxonError::config(format!(
                "Failed to read data directory '{}': {}",
                dir.as_ref().display(),
                e
            ))
        })?;
        if entry.file_type().is_file() && matcher.matches(&entry.file_name().to_string_lossy()) {
            listings.push(entry.into_path());
        }
    }
    Ok(listings)
}

/// Report path written for a listing
pub fn output_path(source: &Path) -> PathBuf {
    source.with_extension("json")
}

/// Classify every listing of a directory and write one JSON report per listing
pub fn run_batch<P: AsRef<Path>>(
    classifier: &TaxonClassifier,
    dir: P,
    options: &BatchOptions,
) -> TaxonResult<BatchSummary> {
    let listings = discover_listings(&dir, &options.pattern)?;
    tracing::info!("Found {} listings in {}", listings.len(), dir.as_ref().display());

    if options.fail_fast {
        return run_until_failure(classifier, &listings, options);
    }

    let parallel = options.parallel && listings.len() > 1;
    let results: Vec<(PathBuf, TaxonResult<BatchEntry>)> = if parallel {
        listings
            .par_iter()
            .map(|source| (source.clone(), process_listing(classifier, source, options)))
            .collect()
    } else {
        listings
            .iter()
            .map(|source| (source.clone(), process_listing(classifier, source, options)))
            .collect()
    };

    let mut summary = BatchSummary::default();
    for (source, result) in results {
        match result {
            Ok(entry) => summary.written.push(entry),
            Err(e) => {
                tracing::warn!("Failed to classify {}: {}", source.display(), e);
                summary.failed.push((source, e.to_string()));
            }
        }
    }
    Ok(summary)
}

/// Stop at the first failing listing; nothing after it is written
fn run_until_failure(
    classifier: &TaxonClassifier,
    listings: &[PathBuf],
    options: &BatchOptions,
) -> TaxonResult<BatchSummary> {
    let written = if options.parallel && listings.len() > 1 {
        listings
            .par_iter()
            .map(|source| process_listing(classifier, source, options))
            .collect::<TaxonResult<Vec<_>>>()?
    } else {
        let mut written = Vec::with_capacity(listings.len());
        for source in listings {
            written.push(process_listing(classifier, source, options)?);
        }
        written
    };
    Ok(BatchSummary { written, failed: Vec::new() })
}

fn process_listing(
    classifier: &TaxonClassifier,
    source: &Path,
    options: &BatchOptions,
) -> TaxonResult<BatchEntry> {
    let classify_options = ClassifyOptions { label: None, selection: options.selection.clone() };
    let collection = classifier.classify_file(source, &classify_options)?;
    let json = classifier.format_collection(&collection, OutputFormat::Json)?;

    let output = output_path(source);
    fs::write(&output, json)?;
    tracing::debug!("Wrote {}", output.display());

    Ok(BatchEntry {
        source: source.to_path_buf(),
        output,
        total: collection.meta.total,
        included: collection.meta.included,
    })
}
