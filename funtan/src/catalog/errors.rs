//! Catalog error types.

use thiserror::Error;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Catalog file could not be read
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file is not valid JSON
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Two entries of the same list share an ID
    #[error("Duplicate {list} id in catalog: {id}")]
    DuplicateId { list: &'static str, id: String },

    /// Entry has an empty ID
    #[error("Empty {0} id in catalog")]
    EmptyId(&'static str),

    /// Entry has a negative stat
    #[error("Negative {stat} on {id}")]
    NegativeStat { id: String, stat: &'static str },

    /// Item kind string is neither weapon nor gear
    #[error("Unknown item kind: {0}")]
    UnknownItemKind(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
