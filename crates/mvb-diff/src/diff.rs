//! Change classification over two sorted entry lists.
//!
//! For each "to" entry the "from" side is binary-searched by path: a miss is
//! an addition, a hit with a different fingerprint is a modification, a hit
//! with an equal fingerprint drops out. "From" entries absent on the "to"
//! side are deletions. O((n+m) log n) with a final sort of the change set.

use std::fmt;

use serde::Serialize;

use mvb_types::{find_by_path, FileEntry};

/// What happened to a path between two trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeKind {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "*")]
    Modify,
    #[serde(rename = "-")]
    Delete,
}

impl ChangeKind {
    pub fn symbol(self) -> &'static str {
        match self {
            ChangeKind::Add => "+",
            ChangeKind::Modify => "*",
            ChangeKind::Delete => "-",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One changed path.
///
/// Additions and modifications carry the "to" side's entry, whose digest is
/// what an apply step copies; deletions carry the "from" side's.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiffEntry {
    pub kind: ChangeKind,
    #[serde(flatten)]
    pub entry: FileEntry,
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.entry.path)
    }
}

/// The change set between two entry lists, sorted ascending by path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Diff {
    pub changes: Vec<DiffEntry>,
}

impl Diff {
    /// Returns `true` if the two sides were identical.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changed paths.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Deleted entries, deepest path first.
    ///
    /// A directory sorts before its children, so reverse path order removes
    /// a directory's contents before the directory itself.
    pub fn deletes_deepest_first(&self) -> impl Iterator<Item = &FileEntry> {
        self.changes
            .iter()
            .rev()
            .filter(|c| c.kind == ChangeKind::Delete)
            .map(|c| &c.entry)
    }

    /// Added and modified entries, shallowest path first.
    ///
    /// Ascending path order creates a directory before anything inside it.
    pub fn upserts_shallowest_first(&self) -> impl Iterator<Item = &DiffEntry> {
        self.changes.iter().filter(|c| c.kind != ChangeKind::Delete)
    }
}

/// Compare two path-sorted lists, producing the changes that turn `from`
/// into `to`.
///
/// Directory entries never modify (no fingerprint on either side); a file
/// replaced by a directory of the same name shows up as a delete of `name`
/// plus an add of `name/`, since the two spell different paths.
pub fn diff(from: &[FileEntry], to: &[FileEntry]) -> Diff {
    let mut changes = Vec::new();

    for entry in to {
        match find_by_path(from, &entry.path) {
            None => changes.push(DiffEntry {
                kind: ChangeKind::Add,
                entry: entry.clone(),
            }),
            Some(old) if old.fingerprint != entry.fingerprint => changes.push(DiffEntry {
                kind: ChangeKind::Modify,
                entry: entry.clone(),
            }),
            Some(_) => {}
        }
    }
    for entry in from {
        if find_by_path(to, &entry.path).is_none() {
            changes.push(DiffEntry {
                kind: ChangeKind::Delete,
                entry: entry.clone(),
            });
        }
    }

    changes.sort_by(|a, b| a.entry.path.cmp(&b.entry.path));
    Diff { changes }
}
