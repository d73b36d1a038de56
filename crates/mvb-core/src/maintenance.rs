//! Store integrity checking and garbage collection.

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::{info, warn};

use mvb_scan::{worker_pool, ScanError};
use mvb_types::Digest;

use crate::error::CoreResult;
use crate::repository::Repository;

/// What an object verification pass found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// How many stored objects were re-hashed.
    pub checked: usize,
    /// Ids whose content no longer matches their address, sorted.
    pub corrupt: Vec<Digest>,
}

impl VerifyReport {
    pub fn is_clean(&self) -> bool {
        self.corrupt.is_empty()
    }
}

/// What a gc sweep removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Ids of the unreferenced objects removed, sorted.
    pub removed: Vec<Digest>,
    /// Shard directories left empty and pruned.
    pub pruned_dirs: usize,
}

impl Repository {
    /// Re-hash every stored object against its address, fanned out on the
    /// worker pool.
    pub fn verify_objects(&self) -> CoreResult<VerifyReport> {
        let ids = self.store().list()?;
        let pool = worker_pool(self.workers()).map_err(ScanError::from)?;
        let intact: CoreResult<Vec<bool>> = pool.install(|| {
            ids.par_iter()
                .map(|id| Ok(self.store().verify(id)?))
                .collect()
        });

        let corrupt: Vec<Digest> = ids
            .iter()
            .zip(intact?)
            .filter(|(_, ok)| !*ok)
            .map(|(id, _)| *id)
            .collect();
        for id in &corrupt {
            warn!(id = %id, "object content does not match its address");
        }
        info!(checked = ids.len(), corrupt = corrupt.len(), "verification finished");
        Ok(VerifyReport {
            checked: ids.len(),
            corrupt,
        })
    }

    /// Remove every object no version references, then prune emptied shard
    /// directories.
    ///
    /// The live set is every index record's manifest object plus every
    /// digest those manifests name. Deleting index records first (the
    /// `delete` command) is what makes their objects collectable here.
    pub fn sweep_unreferenced(&self) -> CoreResult<SweepReport> {
        let mut live: HashSet<Digest> = HashSet::new();
        for record in self.index().records()? {
            live.insert(record.digest);
            for entry in self.version_entries(&record.digest)? {
                if let Some(digest) = entry.digest {
                    live.insert(digest);
                }
            }
        }

        // list() is sorted, so removed ids come out sorted too
        let mut removed = Vec::new();
        for id in self.store().list()? {
            if !live.contains(&id) && self.store().remove(&id)? {
                removed.push(id);
            }
        }
        let pruned_dirs = self.store().prune_empty_shards()?;

        info!(
            removed = removed.len(),
            pruned_dirs,
            live = live.len(),
            "gc sweep finished"
        );
        Ok(SweepReport {
            removed,
            pruned_dirs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use std::fs;

    // ---- verify ----

    #[test]
    fn verify_of_an_intact_store_is_clean() {
        let (_dir, repo) = fixture();
        repo.backup().unwrap();

        let report = repo.verify_objects().unwrap();
        assert_eq!(report.checked, 3);
        assert!(report.is_clean());
    }

    #[test]
    fn verify_reports_tampered_objects() {
        let (_dir, repo) = fixture();
        repo.backup().unwrap();

        let x = Digest::of_bytes(b"X");
        fs::write(repo.store().object_path(&x), "flipped").unwrap();

        let report = repo.verify_objects().unwrap();
        assert_eq!(report.checked, 3);
        assert_eq!(report.corrupt, vec![x]);
    }

    // ---- gc ----

    #[test]
    fn sweep_keeps_everything_referenced() {
        let (_dir, repo) = fixture();
        repo.backup().unwrap();

        let report = repo.sweep_unreferenced().unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(repo.store().list().unwrap().len(), 3);
    }

    #[test]
    fn sweep_collects_orphaned_objects() {
        let (_dir, repo) = fixture();
        repo.backup().unwrap();

        let orphan = Digest::of_bytes(b"orphan");
        repo.store().write(&orphan, b"orphan").unwrap();

        let report = repo.sweep_unreferenced().unwrap();
        assert_eq!(report.removed, vec![orphan]);
        assert!(!repo.store().exists(&orphan).unwrap());
    }

    #[test]
    fn deleted_version_restores_bit_identical_after_gc() {
        let (dir, repo) = fixture();
        repo.backup().unwrap();
        fs::write(dir.path().join("tree").join("a.txt"), "ZZ").unwrap();
        let second = repo.backup().unwrap();

        assert_eq!(repo.delete_versions("v1").unwrap(), 1);
        // first manifest and the X object go; Y stays shared
        let report = repo.sweep_unreferenced().unwrap();
        assert_eq!(report.removed.len(), 2);
        assert_eq!(repo.store().list().unwrap().len(), 3);

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        repo.restore(&second.id, Some(&out)).unwrap();
        assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), "ZZ");
        assert_eq!(
            fs::read_to_string(out.join("b").join("c.txt")).unwrap(),
            "Y"
        );
    }
}
