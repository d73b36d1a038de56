//! Repository orchestration for mvb.
//!
//! A store root carries three fixtures: the `ref` file naming the backed-up
//! tree, the `index` version log, and the `objects/` content store. This
//! crate ties those together with scanning and diffing into the user-facing
//! operations: backup, preview, restore, link, listing, verify, and gc.
//!
//! # Key Types
//!
//! - [`Repository`] -- handle on an initialized store, entry point for every operation
//! - [`BackupOutcome`] / [`Preview`] -- what the snapshot operations report
//! - [`VerifyReport`] / [`SweepReport`] -- what the maintenance operations report

pub mod backup;
pub mod error;
pub mod link;
pub mod maintenance;
pub mod repository;
pub mod restore;
pub mod versions;

#[cfg(test)]
pub(crate) mod testutil;

pub use backup::{BackupOutcome, Preview};
pub use error::{CoreError, CoreResult};
pub use maintenance::{SweepReport, VerifyReport};
pub use repository::{Repository, REF_FILE};

pub use mvb_scan::DEFAULT_WORKERS;
