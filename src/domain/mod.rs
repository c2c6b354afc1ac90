//! Domain layer for category-taxon
//!
//! Architecture: Domain Model - Output records and error types of a classification run
//! - Independent of file systems, terminals and serialization formats
//! - Components and collections are plain values derived from classification state

pub mod components;
pub mod error;

// Re-export main domain types for convenience
pub use components::*;
pub use error::*;
