//! Foundation types for mvb, a local content-addressed backup tool.
//!
//! This crate provides the primitives shared by every other mvb crate:
//! content digests, metadata fingerprints, version timestamps, and the
//! `FileEntry` record a scanned tree is made of.
//!
//! # Key Types
//!
//! - [`Digest`] -- 20-byte content hash, rendered as 40 hex characters; the
//!   address of every stored object
//! - [`Timestamp`] -- fixed-width local time (`YYYYMMDDhhmmss±hhmm`) recorded
//!   alongside each version
//! - [`FileEntry`] -- one scanned path with its fingerprint and content digest
//! - [`metadata_fingerprint`] -- the cheap (path, mtime, size) change signal

pub mod digest;
pub mod entry;
pub mod error;
pub mod fingerprint;
pub mod timestamp;

pub use digest::{Digest, DIGEST_HEX_LEN, DIGEST_LEN};
pub use entry::{find_by_path, sort_entries, FileEntry};
pub use error::TypeError;
pub use fingerprint::metadata_fingerprint;
pub use timestamp::{Timestamp, TIMESTAMP_LEN};
