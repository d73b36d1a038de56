use std::collections::HashMap;

use mvb_types::{Digest, FileEntry};

/// Fingerprint → content digest table derived from a version's entries.
///
/// Built from the latest version before a backup scan: a file whose
/// fingerprint appears here is assumed unchanged and its digest reused
/// without reading content. This is the documented accepted risk -- equal
/// (path, mtime, size) is treated as equal content. Scans that must not
/// trust history (restore, worktree diffs) simply run without a cache.
#[derive(Debug, Default)]
pub struct FastCache {
    map: HashMap<Digest, Digest>,
}

impl FastCache {
    /// Build the table from a decoded manifest's entries. Directory
    /// entries carry no digests and are skipped.
    pub fn from_entries(entries: &[FileEntry]) -> Self {
        let mut map = HashMap::new();
        for entry in entries {
            if let (Some(fingerprint), Some(digest)) = (entry.fingerprint, entry.digest) {
                map.insert(fingerprint, digest);
            }
        }
        Self { map }
    }

    pub fn lookup(&self, fingerprint: &Digest) -> Option<Digest> {
        self.map.get(fingerprint).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
