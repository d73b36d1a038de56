//! Read-only symlink views of a version.

use std::fs;
use std::path::Path;

use tracing::info;

use mvb_types::Digest;

use crate::error::{CoreError, CoreResult};
use crate::repository::Repository;

#[cfg(unix)]
use std::os::unix::fs::symlink;
#[cfg(windows)]
use std::os::windows::fs::symlink_file as symlink;

impl Repository {
    /// Materialize version `id` inside the empty directory `target` as real
    /// directories plus symlinks into the object store.
    ///
    /// Zero-copy: the links share bytes with the store, so a later gc that
    /// collects the version leaves them dangling. Object paths are absolute
    /// (the store root is canonicalized on open), keeping the view valid
    /// from any working directory.
    pub fn link(&self, id: &Digest, target: &Path) -> CoreResult<usize> {
        if fs::read_dir(target)?.next().is_some() {
            return Err(CoreError::TargetNotEmpty(target.to_path_buf()));
        }

        let entries = self.version_entries(id)?;
        for entry in &entries {
            let path = target.join(&entry.path);
            match entry.digest {
                None => fs::create_dir(&path)?,
                Some(digest) => symlink(self.store().object_path(&digest), &path)?,
            }
        }

        info!(
            id = %id.short_hex(),
            target = %target.display(),
            entries = entries.len(),
            "linked"
        );
        Ok(entries.len())
    }
}
