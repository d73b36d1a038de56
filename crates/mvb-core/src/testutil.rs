//! Shared fixtures for the crate's tests.

use std::fs;

use tempfile::{tempdir, TempDir};

use crate::repository::Repository;

/// A fresh store next to a small reference tree:
/// `a.txt` = "X", `b/`, `b/c.txt` = "Y".
pub(crate) fn fixture() -> (TempDir, Repository) {
    let dir = tempdir().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("a.txt"), "X").unwrap();
    fs::create_dir(tree.join("b")).unwrap();
    fs::write(tree.join("b").join("c.txt"), "Y").unwrap();

    let repo = Repository::init(dir.path().join("store"), &tree).unwrap();
    (dir, repo)
}
