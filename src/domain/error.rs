//! Error types shared by every layer of the crate

/// Error types that can occur while building taxonomies or classifying identifiers
#[derive(Debug, thiserror::Error)]
pub enum TaxonError {
    /// Two exclusive claims overlap on the same identifier
    #[error(
        "Exclusive conflict in \"{node}\" @ \"{pattern}\": \"{identifier}\" already claimed by \"{owner}\""
    )]
    TaxonomyConflict { node: String, pattern: String, identifier: String, owner: String },

    /// Pattern compilation failed while building a taxonomy
    #[error("Pattern error: {message}")]
    Pattern { message: String },

    /// Taxonomy definition is structurally invalid
    #[error("Definition error: {message}")]
    Definition { message: String },

    /// A node filter names no node of the taxonomy
    #[error("Unknown taxonomy node: {name}")]
    UnknownNode { name: String },

    /// No builtin taxonomy is registered under this name
    #[error("Unknown taxonomy '{name}'. Available taxonomies: {available}")]
    UnknownTaxonomy { name: String, available: String },

    /// Configuration file could not be loaded or parsed
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File could not be read or written
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Report could not be serialized
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

impl TaxonError {
    /// Create a conflict error
    pub fn conflict(
        node: impl Into<String>,
        pattern: impl Into<String>,
        identifier: impl Into<String>,
        owner: impl Into<String>,
    ) -> Self {
        Self::TaxonomyConflict {
            node: node.into(),
            pattern: pattern.into(),
            identifier: identifier.into(),
            owner: owner.into(),
        }
    }

    /// Create a pattern error
    pub fn pattern(message: impl Into<String>) -> Self {
        Self::Pattern { message: message.into() }
    }

    /// Create a definition error
    pub fn definition(message: impl Into<String>) -> Self {
        Self::Definition { message: message.into() }
    }

    /// Create an unknown node error
    pub fn unknown_node(name: impl Into<String>) -> Self {
        Self::UnknownNode { name: name.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization { message: message.into() }
    }

    /// Whether this error signals overlapping exclusive claims
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::TaxonomyConflict { .. })
    }

    /// Process exit code used by the command-line interface
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::TaxonomyConflict { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type for taxonomy operations
pub type TaxonResult<T> = Result<T, TaxonError>;
