//! Error types for the version index.

use thiserror::Error;

/// Errors that can occur while reading or mutating the version index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// No record matched the given pattern or indexed form.
    #[error("version not found: {0}")]
    NotFound(String),

    /// More than one record matched a pattern that must resolve uniquely.
    #[error("ambiguous version pattern {pattern:?}: {count} matches")]
    Ambiguous { pattern: String, count: usize },

    /// The index file does not have the fixed-width record shape.
    #[error("corrupt index: {0}")]
    Corrupt(String),

    /// Underlying filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
