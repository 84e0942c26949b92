//! Error types for archive access and scene resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for abc-readgeo operations.
///
/// Only archive accessors and loaders return these. Sampling itself degrades
/// to identity/empty results instead of failing a whole query.
#[derive(Error, Debug)]
pub enum Error {
    /// File does not exist or cannot be accessed
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Archive could not be opened or is structurally broken
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// Invalid data structure inside an archive
    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    /// Node index does not belong to the archive
    #[error("Unknown node id {0}")]
    UnknownNode(usize),

    /// Object not found by name or path
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// Sample index out of bounds
    #[error("Sample index {index} out of bounds (count: {count})")]
    SampleOutOfBounds { index: usize, count: usize },

    /// Schema mismatch, e.g. asking a camera for mesh data
    #[error("Schema mismatch: expected {expected}, got {actual}")]
    SchemaMismatch { expected: String, actual: String },

    /// Reader settings failed validation
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON scene or settings parse error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid structure error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidStructure(msg.into())
    }

    /// Create a schema mismatch error.
    pub fn schema(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for abc-readgeo operations.
pub type Result<T> = std::result::Result<T, Error>;
