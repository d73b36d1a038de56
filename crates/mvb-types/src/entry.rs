use serde::Serialize;

use crate::digest::Digest;

/// One entry of a scanned tree or a decoded manifest.
///
/// Paths are relative to the tree root, slash-separated, with directories
/// carrying a trailing `/`. Directories have no fingerprint or digest (the
/// manifest renders them as all-space sentinel columns). Within a list,
/// paths are unique and the list is sorted ascending by path; every producer
/// restores that invariant before handing a list out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    pub path: String,
    pub fingerprint: Option<Digest>,
    pub digest: Option<Digest>,
}

impl FileEntry {
    /// Entry for a directory. `path` must already carry its trailing `/`.
    pub fn dir(path: impl Into<String>) -> Self {
        let path = path.into();
        debug_assert!(path.ends_with('/'));
        Self {
            path,
            fingerprint: None,
            digest: None,
        }
    }

    /// Entry for a regular file.
    pub fn file(path: impl Into<String>, fingerprint: Digest, digest: Digest) -> Self {
        Self {
            path: path.into(),
            fingerprint: Some(fingerprint),
            digest: Some(digest),
        }
    }

    pub fn is_dir(&self) -> bool {
        self.path.ends_with('/')
    }
}

/// Restore the list invariant: ascending byte order by path.
pub fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| a.path.cmp(&b.path));
}

/// Binary-search a sorted list for an exact path.
pub fn find_by_path<'a>(entries: &'a [FileEntry], path: &str) -> Option<&'a FileEntry> {
    entries
        .binary_search_by(|e| e.path.as_str().cmp(path))
        .ok()
        .map(|i| &entries[i])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(b: u8) -> Digest {
        Digest::from_raw([b; 20])
    }

    fn sample() -> Vec<FileEntry> {
        let mut entries = vec![
            FileEntry::file("b/c.txt", d(1), d(2)),
            FileEntry::dir("b/"),
            FileEntry::file("a.txt", d(3), d(4)),
        ];
        sort_entries(&mut entries);
        entries
    }

    #[test]
    fn sort_orders_directories_before_children() {
        let entries = sample();
        let paths: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["a.txt", "b/", "b/c.txt"]);
    }

    #[test]
    fn dir_entries_carry_no_digests() {
        let e = FileEntry::dir("b/");
        assert!(e.is_dir());
        assert!(e.fingerprint.is_none());
        assert!(e.digest.is_none());
    }

    #[test]
    fn find_by_path_hits_and_misses() {
        let entries = sample();
        assert_eq!(find_by_path(&entries, "b/c.txt").unwrap().digest, Some(d(2)));
        assert!(find_by_path(&entries, "b/").unwrap().is_dir());
        assert!(find_by_path(&entries, "missing").is_none());
        // exact match only, no prefix semantics
        assert!(find_by_path(&entries, "b").is_none());
    }
}
