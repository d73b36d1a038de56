//! Error types for repository operations.

use std::path::PathBuf;

use thiserror::Error;

use mvb_types::Digest;

/// Errors from orchestrated repository operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The directory carries no `ref` file and is not a store.
    #[error("no store at {0:?} (missing ref file, run init first)")]
    NotInitialized(PathBuf),

    /// init refuses to overwrite an existing store.
    #[error("store at {0:?} is already initialized")]
    AlreadyInitialized(PathBuf),

    /// An operation needed a version but the index has none.
    #[error("the index has no versions")]
    NoVersions,

    /// Restore preflight found manifest references without stored objects.
    #[error("version {version} references {} missing object(s)", .missing.len())]
    MissingObjects {
        version: Digest,
        missing: Vec<Digest>,
    },

    /// link writes into an existing empty directory only.
    #[error("link target {0:?} is not an empty directory")]
    TargetNotEmpty(PathBuf),

    /// A path was not found in a version's entries.
    #[error("path {path:?} not found in version {version}")]
    PathNotFound { version: Digest, path: String },

    /// A directory entry has no object to stream.
    #[error("path {path:?} in version {version} is a directory")]
    IsADirectory { version: Digest, path: String },

    /// Object store failure.
    #[error("object store: {0}")]
    Store(#[from] mvb_store::StoreError),

    /// Version index failure.
    #[error("index: {0}")]
    Index(#[from] mvb_index::IndexError),

    /// Manifest codec failure.
    #[error("manifest: {0}")]
    Manifest(#[from] mvb_manifest::ManifestError),

    /// Tree scan failure.
    #[error("scan: {0}")]
    Scan(#[from] mvb_scan::ScanError),

    /// Filesystem failure outside the store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for repository results.
pub type CoreResult<T> = Result<T, CoreError>;
