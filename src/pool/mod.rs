//! Identifier pools read from plain-text listings
//!
//! A listing holds one identifier per line. Lines are trimmed, blank lines are
//! skipped and duplicates collapse. A file named `<prefix>_<label>.txt` carries
//! the label of the pool (e.g. `bic_2021.txt` is labelled `2021`).

use crate::domain::{TaxonError, TaxonResult};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A deduplicated set of identifiers with an optional label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierPool {
    identifiers: BTreeSet<String>,
    label: Option<String>,
}

impl IdentifierPool {
    /// Parse a listing
    pub fn parse(content: &str) -> Self {
        let identifiers: BTreeSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { identifiers, label: None }
    }

    /// Load a listing from a file, labelling it after the file name
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> TaxonResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            tracing::warn!("Failed to read identifier listing {}: {}", path.display(), e);
            TaxonError::from(e)
        })?;

        let pool = Self::parse(&content).with_label_opt(label_from_path(path));
        tracing::debug!("Loaded {} identifiers from {}", pool.len(), path.display());
        Ok(pool)
    }

    /// Set the label
    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.with_label_opt(Some(label.into()))
    }

    fn with_label_opt(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn identifiers(&self) -> &BTreeSet<String> {
        &self.identifiers
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.identifiers.iter().map(String::as_str)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for IdentifierPool {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { identifiers: iter.into_iter().map(Into::into).collect(), label: None }
    }
}

/// Label encoded in a file name as the part after the first underscore of its stem
pub fn label_from_path(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    stem.split('_').nth(1).filter(|label| !label.is_empty()).map(str::to_string)
}
