//! Version listing, resolution, and content access.

use std::io::Write;

use mvb_diff::{diff, Diff};
use mvb_index::{parse_indexed_pattern, VersionRecord};
use mvb_scan::scan;
use mvb_types::{find_by_path, Digest, FileEntry};

use crate::error::{CoreError, CoreResult};
use crate::repository::Repository;

impl Repository {
    /// All versions, newest first; the listing order.
    pub fn versions_newest_first(&self) -> CoreResult<Vec<VersionRecord>> {
        let mut out = Vec::new();
        for record in self.index().iter_rev()? {
            out.push(record?);
        }
        Ok(out)
    }

    /// Versions whose digest or timestamp starts with `pattern`, newest
    /// first.
    pub fn find_versions(&self, pattern: &str) -> CoreResult<Vec<VersionRecord>> {
        let mut matches = self.index().find_by_prefix(pattern)?;
        matches.reverse();
        Ok(matches)
    }

    /// Resolve a version argument (`v<k>`, digest prefix, or timestamp
    /// prefix) to exactly one record.
    pub fn resolve(&self, pattern: &str) -> CoreResult<VersionRecord> {
        Ok(self.index().resolve(pattern)?)
    }

    /// Resolve `pattern`, or the newest version when none was given.
    pub fn resolve_or_latest(&self, pattern: Option<&str>) -> CoreResult<VersionRecord> {
        match pattern {
            Some(p) => self.resolve(p),
            None => self.index().latest()?.ok_or(CoreError::NoVersions),
        }
    }

    /// Decode the entry list of version `id` from its manifest object.
    pub fn version_entries(&self, id: &Digest) -> CoreResult<Vec<FileEntry>> {
        Ok(mvb_manifest::decode_bytes(&self.store().read(id)?)?)
    }

    /// Manifest text of version `id`.
    ///
    /// Canonical re-encode of the decoded entries; byte-equal to the stored
    /// object because the codec admits exactly one rendering per entry list.
    pub fn manifest_text(&self, id: &Digest) -> CoreResult<String> {
        Ok(mvb_manifest::encode(&self.version_entries(id)?))
    }

    /// Entries of version `id` whose path starts with `prefix` (`""` for
    /// all of them).
    pub fn entries_under(&self, id: &Digest, prefix: &str) -> CoreResult<Vec<FileEntry>> {
        Ok(self
            .version_entries(id)?
            .into_iter()
            .filter(|e| e.path.starts_with(prefix))
            .collect())
    }

    /// Stream the object behind `path` in version `id` into `out`,
    /// returning the byte count.
    pub fn read_file_to(&self, id: &Digest, path: &str, out: &mut dyn Write) -> CoreResult<u64> {
        let entries = self.version_entries(id)?;
        let entry = find_by_path(&entries, path).ok_or_else(|| CoreError::PathNotFound {
            version: *id,
            path: path.to_string(),
        })?;
        match entry.digest {
            Some(digest) => Ok(self.store().read_to(&digest, out)?),
            None => Err(CoreError::IsADirectory {
                version: *id,
                path: path.to_string(),
            }),
        }
    }

    /// Change set between two versions (`from` → `to`).
    pub fn diff_versions(&self, from: &Digest, to: &Digest) -> CoreResult<Diff> {
        Ok(diff(
            &self.version_entries(from)?,
            &self.version_entries(to)?,
        ))
    }

    /// Change set that turns version `from` into the current reference
    /// tree. The tree is scanned with full content hashing, no cache.
    pub fn diff_worktree(&self, from: &Digest) -> CoreResult<Diff> {
        let tree = scan(self.ref_root(), self.workers(), None)?;
        Ok(diff(&self.version_entries(from)?, &tree))
    }

    /// Delete versions from the index: a `v<k>` form removes one record by
    /// position, anything else removes every prefix match. Returns how many
    /// records were removed. Objects stay in the store until a gc sweep.
    pub fn delete_versions(&self, pattern: &str) -> CoreResult<usize> {
        match parse_indexed_pattern(pattern) {
            Some(k) => {
                self.index().delete_indexed(k)?;
                Ok(1)
            }
            None => Ok(self.index().delete_matching(pattern)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use std::fs;

    // ---- listing / resolution ----

    #[test]
    fn versions_list_newest_first() {
        let (dir, repo) = fixture();
        let first = repo.backup().unwrap();
        fs::write(dir.path().join("tree").join("a.txt"), "ZZ").unwrap();
        let second = repo.backup().unwrap();

        let listed = repo.versions_newest_first().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].digest, second.id);
        assert_eq!(listed[1].digest, first.id);
    }

    #[test]
    fn resolve_by_prefix_index_and_latest() {
        let (dir, repo) = fixture();
        let first = repo.backup().unwrap();
        fs::write(dir.path().join("tree").join("a.txt"), "ZZ").unwrap();
        let second = repo.backup().unwrap();

        let hex = first.id.to_hex();
        assert_eq!(repo.resolve(&hex[..10]).unwrap().digest, first.id);
        assert_eq!(repo.resolve("v1").unwrap().digest, first.id);
        assert_eq!(repo.resolve("v0").unwrap().digest, second.id);
        assert_eq!(repo.resolve_or_latest(None).unwrap().digest, second.id);
        assert_eq!(
            repo.resolve_or_latest(Some("v-1")).unwrap().digest,
            first.id
        );
    }

    #[test]
    fn latest_of_an_empty_store_is_no_versions() {
        let (_dir, repo) = fixture();
        assert!(matches!(
            repo.resolve_or_latest(None),
            Err(CoreError::NoVersions)
        ));
    }

    #[test]
    fn find_versions_returns_prefix_matches() {
        let (_dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        let hex = outcome.id.to_hex();
        assert_eq!(repo.find_versions(&hex[..6]).unwrap().len(), 1);
        assert!(repo.find_versions("ffff").unwrap().is_empty());
    }

    // ---- content access ----

    #[test]
    fn manifest_text_matches_the_stored_object() {
        let (_dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        let text = repo.manifest_text(&outcome.id).unwrap();
        assert_eq!(text.as_bytes(), repo.store().read(&outcome.id).unwrap());
        assert_eq!(Digest::of_bytes(text.as_bytes()), outcome.id);
    }

    #[test]
    fn entries_under_filters_by_prefix() {
        let (_dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        let under_b: Vec<String> = repo
            .entries_under(&outcome.id, "b/")
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(under_b, ["b/", "b/c.txt"]);
        assert_eq!(repo.entries_under(&outcome.id, "").unwrap().len(), 3);
    }

    #[test]
    fn read_file_streams_object_content() {
        let (_dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        let mut out = Vec::new();
        let n = repo.read_file_to(&outcome.id, "b/c.txt", &mut out).unwrap();
        assert_eq!(n, 1);
        assert_eq!(out, b"Y");
    }

    #[test]
    fn read_file_rejects_missing_and_directory_paths() {
        let (_dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        let mut out = Vec::new();
        assert!(matches!(
            repo.read_file_to(&outcome.id, "missing.txt", &mut out),
            Err(CoreError::PathNotFound { .. })
        ));
        assert!(matches!(
            repo.read_file_to(&outcome.id, "b/", &mut out),
            Err(CoreError::IsADirectory { .. })
        ));
    }

    // ---- diffing ----

    #[test]
    fn diff_versions_shows_the_modification() {
        let (dir, repo) = fixture();
        let first = repo.backup().unwrap();
        fs::write(dir.path().join("tree").join("a.txt"), "ZZ").unwrap();
        let second = repo.backup().unwrap();

        let diff = repo.diff_versions(&first.id, &second.id).unwrap();
        let lines: Vec<String> = diff.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(lines, ["* a.txt"]);
    }

    #[test]
    fn diff_worktree_sees_unrecorded_changes() {
        let (dir, repo) = fixture();
        let outcome = repo.backup().unwrap();

        assert!(repo.diff_worktree(&outcome.id).unwrap().is_empty());

        fs::write(dir.path().join("tree").join("d.txt"), "new").unwrap();
        let diff = repo.diff_worktree(&outcome.id).unwrap();
        let lines: Vec<String> = diff.changes.iter().map(|c| c.to_string()).collect();
        assert_eq!(lines, ["+ d.txt"]);
    }

    // ---- deletion ----

    #[test]
    fn delete_versions_by_position_and_pattern() {
        let (dir, repo) = fixture();
        let first = repo.backup().unwrap();
        fs::write(dir.path().join("tree").join("a.txt"), "ZZ").unwrap();
        let second = repo.backup().unwrap();

        assert_eq!(repo.delete_versions("v1").unwrap(), 1);
        let remaining = repo.versions_newest_first().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].digest, second.id);

        assert_eq!(repo.delete_versions(&first.id.to_hex()[..8]).unwrap(), 0);
        assert_eq!(repo.delete_versions(&second.id.to_hex()[..8]).unwrap(), 1);
        assert!(repo.versions_newest_first().unwrap().is_empty());
    }
}
