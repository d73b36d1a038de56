//! Store-root layout and repository configuration.

use std::fs;
use std::io;
use std::path::{self, Path, PathBuf};

use tracing::{debug, info};

use mvb_index::{VersionIndex, INDEX_FILE};
use mvb_scan::DEFAULT_WORKERS;
use mvb_store::{ObjectStore, OBJECTS_DIR};

use crate::error::{CoreError, CoreResult};

/// Name of the file at the store root holding the reference-tree path.
pub const REF_FILE: &str = "ref";

/// Handle on an initialized store.
///
/// Opening reads the `ref` file once and canonicalizes the store root, so
/// object paths (and the symlinks `link` creates from them) stay valid from
/// any working directory. The worker cap bounds every parallel phase: scan
/// hashing, backup copies, and verification.
#[derive(Debug)]
pub struct Repository {
    store_root: PathBuf,
    ref_root: PathBuf,
    workers: usize,
    store: ObjectStore,
    index: VersionIndex,
}

impl Repository {
    /// Initialize `store_root` as a store backing up `ref_root`.
    ///
    /// Creates the full skeleton (`ref`, empty `index`, `objects/`) and
    /// refuses a root that already carries a `ref` file. The reference path
    /// is recorded absolute so it survives a change of working directory;
    /// the tree itself does not have to exist yet.
    pub fn init(store_root: impl AsRef<Path>, ref_root: impl AsRef<Path>) -> CoreResult<Self> {
        fs::create_dir_all(store_root.as_ref())?;
        let store_root = fs::canonicalize(store_root.as_ref())?;
        let ref_root = path::absolute(ref_root.as_ref())?;

        let ref_file = store_root.join(REF_FILE);
        if ref_file.exists() {
            return Err(CoreError::AlreadyInitialized(store_root));
        }
        fs::write(&ref_file, format!("{}\n", ref_root.display()))?;
        fs::write(store_root.join(INDEX_FILE), "")?;
        fs::create_dir_all(store_root.join(OBJECTS_DIR))?;

        info!(store = %store_root.display(), reference = %ref_root.display(), "store initialized");
        Self::open(store_root)
    }

    /// Open an initialized store, reading its `ref` file.
    pub fn open(store_root: impl AsRef<Path>) -> CoreResult<Self> {
        let store_root = match fs::canonicalize(store_root.as_ref()) {
            Ok(p) => p,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::NotInitialized(store_root.as_ref().to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        let ref_root = match fs::read_to_string(store_root.join(REF_FILE)) {
            Ok(text) => PathBuf::from(text.trim_end()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CoreError::NotInitialized(store_root));
            }
            Err(e) => return Err(e.into()),
        };

        debug!(store = %store_root.display(), reference = %ref_root.display(), "store opened");
        Ok(Self {
            store: ObjectStore::open(&store_root),
            index: VersionIndex::open(&store_root),
            store_root,
            ref_root,
            workers: DEFAULT_WORKERS,
        })
    }

    /// Replace the worker cap for parallel phases. Clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn store_root(&self) -> &Path {
        &self.store_root
    }

    /// Root of the backed-up tree, as recorded in the `ref` file.
    pub fn ref_root(&self) -> &Path {
        &self.ref_root
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub(crate) fn store(&self) -> &ObjectStore {
        &self.store
    }

    pub(crate) fn index(&self) -> &VersionIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::fixture;
    use tempfile::tempdir;

    // ---- init ----

    #[test]
    fn init_creates_the_store_skeleton() {
        let (dir, repo) = fixture();
        let store = dir.path().join("store");

        assert!(store.join("ref").is_file());
        assert!(store.join("objects").is_dir());
        assert!(store.join("index").is_file());
        assert_eq!(fs::metadata(store.join("index")).unwrap().len(), 0);
        assert!(repo.ref_root().ends_with("tree"));
    }

    #[test]
    fn init_refuses_an_initialized_root() {
        let (dir, _repo) = fixture();
        let err =
            Repository::init(dir.path().join("store"), dir.path().join("tree")).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyInitialized(_)));
    }

    #[test]
    fn init_stores_the_reference_path_absolute() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path().join("store"), "some-rel-tree").unwrap();
        assert!(repo.ref_root().is_absolute());
        assert!(repo.ref_root().ends_with("some-rel-tree"));
    }

    // ---- open ----

    #[test]
    fn open_requires_a_ref_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()),
            Err(CoreError::NotInitialized(_))
        ));
        assert!(matches!(
            Repository::open(dir.path().join("nowhere")),
            Err(CoreError::NotInitialized(_))
        ));
    }

    #[test]
    fn open_reads_the_recorded_ref_root() {
        let (dir, _) = fixture();
        let repo = Repository::open(dir.path().join("store")).unwrap();
        assert_eq!(repo.ref_root(), dir.path().join("tree"));
    }

    // ---- configuration ----

    #[test]
    fn worker_cap_defaults_and_clamps() {
        let (_dir, repo) = fixture();
        assert_eq!(repo.workers(), DEFAULT_WORKERS);
        let repo = repo.with_workers(0);
        assert_eq!(repo.workers(), 1);
        let repo = repo.with_workers(8);
        assert_eq!(repo.workers(), 8);
    }
}
