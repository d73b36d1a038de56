//! Content-addressed object storage for mvb.
//!
//! Every payload -- raw file bytes or manifest text -- lives at
//! `objects/<first 2 hex>/<remaining 38 hex>` under the store root, keyed by
//! the SHA-1 digest of its content. The store never interprets payloads.
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are write-if-absent: re-writing an existing id is a no-op, which
//!    makes concurrent duplicate writes and retries after failure safe.
//! 3. A write is atomic from the reader's view: content lands in a temp file
//!    inside the store and is renamed into place, so no reader ever observes
//!    a partially written object at an address that `exists` reports.
//! 4. Concurrent reads are always safe (objects are immutable).
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{ObjectStore, OBJECTS_DIR};
