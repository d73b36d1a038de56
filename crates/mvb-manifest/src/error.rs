//! Error types for the manifest codec.

use thiserror::Error;

/// Errors from decoding manifest text.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The text does not have the fixed-column manifest shape.
    #[error("corrupt manifest at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    /// The stored object is not manifest text at all.
    #[error("manifest object is not valid UTF-8")]
    NotText,
}

/// Convenience alias for manifest results.
pub type ManifestResult<T> = Result<T, ManifestError>;
