//! Tree scanning and fingerprinting for mvb.
//!
//! A scan walks a root directory and produces the sorted `FileEntry` list a
//! snapshot is built from: relative slash paths, directories suffixed `/`
//! with sentinel digests, files fingerprinted by (path, mtime, size) and
//! content-hashed.
//!
//! Content hashing is the expensive part, so it is fanned out on a bounded
//! worker pool and, when a fast cache from the previous version is supplied,
//! skipped entirely for files whose fingerprint is already known. Workers
//! complete in arbitrary order; the scan joins them all and re-sorts by path
//! before returning, so callers never observe scheduling effects.

pub mod cache;
pub mod error;
pub mod pool;
pub mod scanner;

pub use cache::FastCache;
pub use error::{ScanError, ScanResult};
pub use pool::{worker_pool, DEFAULT_WORKERS};
pub use scanner::scan;
