//! Append-only version log for mvb.
//!
//! The `index` file under a store root records one line per version,
//! chronologically: `"<40-hex digest> <timestamp>\n"`. Every record is
//! exactly [`RECORD_LEN`] bytes, so record `i` lives at byte offset
//! `i * RECORD_LEN` and random access never parses more than one record.
//!
//! The index is single-writer by design contract: backup appends, delete
//! compacts, and concurrent writers against the same file are out of
//! contract. Reads tolerate a missing file (an uninitialized store has zero
//! versions); any other shape mismatch is fatal corruption.

pub mod error;
pub mod index;
pub mod record;

pub use error::{IndexError, IndexResult};
pub use index::{parse_indexed_pattern, ReverseIter, VersionIndex, INDEX_FILE};
pub use record::{VersionRecord, RECORD_LEN};
