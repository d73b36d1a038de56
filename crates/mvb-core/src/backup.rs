//! Snapshot creation: scan, manifest, object copy, index append.

use rayon::prelude::*;
use tracing::{debug, info};

use mvb_index::VersionRecord;
use mvb_scan::{scan, worker_pool, FastCache, ScanError};
use mvb_types::{Digest, FileEntry, Timestamp};

use crate::error::CoreResult;
use crate::repository::Repository;

/// What a backup run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOutcome {
    /// Version id: the digest of the manifest text.
    pub id: Digest,
    /// `false` when the snapshot already existed and nothing was written.
    pub created: bool,
}

/// A dry-run snapshot: what backup would record, without writing anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub id: Digest,
    pub manifest: String,
}

impl Repository {
    /// Scan the reference tree and render the snapshot it would record.
    pub fn preview(&self) -> CoreResult<Preview> {
        let (_, manifest, id) = self.snapshot()?;
        Ok(Preview { id, manifest })
    }

    /// Record a new version of the reference tree.
    ///
    /// An unchanged tree reuses its existing version: the manifest digest
    /// already has an object, so nothing is copied and the index is left
    /// alone.
    pub fn backup(&self) -> CoreResult<BackupOutcome> {
        let (entries, manifest, id) = self.snapshot()?;
        if self.store().exists(&id)? {
            info!(id = %id.short_hex(), "unchanged tree, version already recorded");
            return Ok(BackupOutcome { id, created: false });
        }

        self.copy_new_objects(&entries)?;
        self.store().write(&id, manifest.as_bytes())?;
        self.index().append(&VersionRecord::new(id, Timestamp::now()))?;
        info!(id = %id.short_hex(), entries = entries.len(), "version recorded");
        Ok(BackupOutcome { id, created: true })
    }

    /// Scan with the fast cache of the latest version, encode, digest.
    fn snapshot(&self) -> CoreResult<(Vec<FileEntry>, String, Digest)> {
        let cache = match self.index().latest()? {
            Some(latest) => Some(FastCache::from_entries(
                &self.version_entries(&latest.digest)?,
            )),
            None => None,
        };
        let entries = scan(self.ref_root(), self.workers(), cache.as_ref())?;
        let manifest = mvb_manifest::encode(&entries);
        let id = Digest::of_bytes(manifest.as_bytes());
        debug!(id = %id.short_hex(), entries = entries.len(), "snapshot rendered");
        Ok((entries, manifest, id))
    }

    /// Copy content objects absent from the store, fanned out on the worker
    /// pool. Fail-fast: the first failed copy aborts the backup before the
    /// manifest or index are touched.
    fn copy_new_objects(&self, entries: &[FileEntry]) -> CoreResult<()> {
        let pool = worker_pool(self.workers()).map_err(ScanError::from)?;
        let written: CoreResult<Vec<bool>> = pool.install(|| {
            entries
                .par_iter()
                .filter_map(|e| e.digest.map(|digest| (digest, e.path.as_str())))
                .map(|(digest, path)| {
                    Ok(self.store().import(&digest, &self.ref_root().join(path))?)
                })
                .collect()
        });
        let copied = written?.into_iter().filter(|wrote| *wrote).count();
        debug!(copied, "content objects copied");
        Ok(())
    }
}
