//! Diff engine for mvb.
//!
//! Compares two path-sorted entry lists and produces the change set that
//! turns the first into the second. Entries are matched by path and compared
//! by metadata fingerprint; content digests ride along so that applying the
//! diff (restore) knows which objects to copy.
//!
//! # Key Types
//!
//! - [`Diff`] / [`DiffEntry`] -- The sorted change set and its elements
//! - [`ChangeKind`] -- `+` add, `*` modify, `-` delete

pub mod diff;

pub use diff::{diff, ChangeKind, Diff, DiffEntry};
