//! Error types for tree scanning.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during a scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Directory traversal failed (missing root, unreadable entry).
    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    /// Entry paths must be representable in the manifest text.
    #[error("path {0:?} is not valid UTF-8")]
    NonUtf8Path(PathBuf),

    /// The walker yielded a path outside the scan root.
    #[error("path {0:?} escapes the scan root")]
    OutsideRoot(PathBuf),

    /// The bounded worker pool could not be constructed.
    #[error("worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// Underlying filesystem failure while hashing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for scan results.
pub type ScanResult<T> = Result<T, ScanError>;
