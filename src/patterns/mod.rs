//! Pattern matching for taxonomy rules
//!
//! Architectural Principle: Service Layer - Pattern groups are compiled once per taxonomy
//! - Every pattern matches from the start of an identifier and may stop anywhere
//! - Matching is case-sensitive; category codes differ by case

use crate::domain::{TaxonError, TaxonResult};
use regex::{Regex, RegexSet};

/// An ordered, compiled group of prefix-anchored regular expressions
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Patterns as authored, in declaration order
    sources: Vec<String>,
    /// Anchored patterns compiled into a single automaton
    set: RegexSet,
}

impl PatternSet {
    /// Compile a group of patterns
    pub fn new<I, S>(patterns: I) -> TaxonResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<String> = patterns.into_iter().map(Into::into).collect();

        // Compile one by one first so the error names the offending pattern
        for source in &sources {
            Regex::new(&anchor(source)).map_err(|e| {
                TaxonError::pattern(format!("Invalid regex '{source}': {e}"))
            })?;
        }

        let set = RegexSet::new(sources.iter().map(|s| anchor(s)))
            .map_err(|e| TaxonError::pattern(format!("Invalid pattern group: {e}")))?;

        Ok(Self { sources, set })
    }

    /// A group that matches nothing
    pub fn empty() -> Self {
        Self { sources: Vec::new(), set: RegexSet::empty() }
    }

    /// Whether any pattern of the group matches the identifier
    pub fn is_match(&self, identifier: &str) -> bool {
        self.set.is_match(identifier)
    }

    /// The first pattern, in declaration order, that matches the identifier
    pub fn first_match(&self, identifier: &str) -> Option<&str> {
        self.set.matches(identifier).iter().next().map(|index| self.sources[index].as_str())
    }

    /// Patterns as authored
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::empty()
    }
}

/// Whether any pattern of the group matches the identifier from its first character
pub fn matches(identifier: &str, patterns: &PatternSet) -> bool {
    patterns.is_match(identifier)
}

/// Anchor a pattern at the start of the haystack, leaving its end open
fn anchor(pattern: &str) -> String {
    format!("^(?:{pattern})")
}
