//! Materializing a version back onto a filesystem tree.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::Path;

use tracing::{debug, info};

use mvb_diff::{diff, Diff};
use mvb_scan::scan;
use mvb_types::Digest;

use crate::error::{CoreError, CoreResult};
use crate::repository::Repository;

impl Repository {
    /// Rewrite `target` (default: the reference tree) to match version
    /// `id`, returning the change set that was applied.
    ///
    /// The target is scanned with full content hashing; restore trusts what
    /// is on disk now, never fingerprint history. Every object the plan
    /// needs must be present in the store before anything is touched, so a
    /// manifest pointing at missing objects aborts with the target intact.
    ///
    /// Deletions apply deepest-first, so directories empty out before they
    /// are removed; creations apply shallowest-first, so directories exist
    /// before their contents.
    pub fn restore(&self, id: &Digest, target: Option<&Path>) -> CoreResult<Diff> {
        let target = target.unwrap_or_else(|| self.ref_root());
        let to = self.version_entries(id)?;
        let from = scan(target, self.workers(), None)?;
        let plan = diff(&from, &to);

        self.preflight_objects(id, &plan)?;

        for entry in plan.deletes_deepest_first() {
            let path = target.join(&entry.path);
            if entry.is_dir() {
                fs::remove_dir(&path)?;
            } else {
                fs::remove_file(&path)?;
            }
            debug!(path = %path.display(), "removed");
        }
        for change in plan.upserts_shallowest_first() {
            let path = target.join(&change.entry.path);
            match change.entry.digest {
                None => fs::create_dir_all(&path)?,
                Some(digest) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    let mut out = File::create(&path)?;
                    self.store().read_to(&digest, &mut out)?;
                }
            }
            debug!(path = %path.display(), kind = %change.kind, "applied");
        }

        info!(
            id = %id.short_hex(),
            target = %target.display(),
            changes = plan.len(),
            "restore complete"
        );
        Ok(plan)
    }

    /// Every object the plan will copy must already be stored.
    fn preflight_objects(&self, id: &Digest, plan: &Diff) -> CoreResult<()> {
        let mut missing = BTreeSet::new();
        for change in plan.upserts_shallowest_first() {
            if let Some(digest) = change.entry.digest {
                if !self.store().exists(&digest)? {
                    missing.insert(digest);
                }
            }
        }
        if missing.is_empty() {
            return Ok(());
        }
        Err(CoreError::MissingObjects {
            version: *id,
            missing: missing.into_iter().collect(),
        })
    }
}
