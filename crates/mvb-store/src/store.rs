use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use mvb_types::{Digest, DIGEST_HEX_LEN};

use crate::error::{StoreError, StoreResult};

/// Name of the object directory under a store root.
pub const OBJECTS_DIR: &str = "objects";

/// Length of a shard directory name (hex prefix of the digest).
const SHARD_LEN: usize = 2;

/// Filesystem-backed, write-once object store.
///
/// Objects live at `objects/<2-hex>/<38-hex>`; the 2-character shard bounds
/// directory fan-out. See the crate docs for the write-if-absent and
/// atomicity contract.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Handle on the object store under `store_root`. Does not touch the
    /// filesystem; directories are created when first written to.
    pub fn open(store_root: impl AsRef<Path>) -> Self {
        Self {
            root: store_root.as_ref().join(OBJECTS_DIR),
        }
    }

    /// Path of the object for `id` (existing or not).
    pub fn object_path(&self, id: &Digest) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..SHARD_LEN]).join(&hex[SHARD_LEN..])
    }

    /// Whether an object is present at its address.
    pub fn exists(&self, id: &Digest) -> StoreResult<bool> {
        match fs::metadata(self.object_path(id)) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Store `data` at `id` unless already present.
    ///
    /// Returns `true` if the object was written, `false` if it already
    /// existed. The caller guarantees `id` is the digest of `data`.
    pub fn write(&self, id: &Digest, data: &[u8]) -> StoreResult<bool> {
        if self.exists(id)? {
            return Ok(false);
        }
        let mut tmp = self.temp_file()?;
        tmp.write_all(data)?;
        self.persist(id, tmp)?;
        debug!(id = %id.short_hex(), bytes = data.len(), "object written");
        Ok(true)
    }

    /// Store the content of an existing file at `id` unless already present,
    /// streaming instead of buffering the payload.
    pub fn import(&self, id: &Digest, source: &Path) -> StoreResult<bool> {
        if self.exists(id)? {
            return Ok(false);
        }
        let mut src = File::open(source)?;
        let mut tmp = self.temp_file()?;
        io::copy(&mut src, &mut tmp)?;
        self.persist(id, tmp)?;
        debug!(id = %id.short_hex(), source = %source.display(), "object imported");
        Ok(true)
    }

    /// Read an object fully into memory.
    pub fn read(&self, id: &Digest) -> StoreResult<Vec<u8>> {
        match fs::read(self.object_path(id)) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(*id)),
            Err(e) => Err(e.into()),
        }
    }

    /// Stream an object into `writer`, returning the byte count.
    pub fn read_to(&self, id: &Digest, writer: &mut dyn Write) -> StoreResult<u64> {
        let mut f = match File::open(self.object_path(id)) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(io::copy(&mut f, writer)?)
    }

    /// Re-hash an object and compare against its address.
    ///
    /// Returns `false` for tampered or truncated content.
    pub fn verify(&self, id: &Digest) -> StoreResult<bool> {
        let f = match File::open(self.object_path(id)) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(*id))
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Digest::of_reader(f)? == *id)
    }

    /// Every object id currently stored, sorted.
    ///
    /// Misnamed shard directories and misnamed entries inside a shard are
    /// skipped with a warning; stray files at the objects root (e.g. a temp
    /// file left by an interrupted write) are ignored. A missing object
    /// directory reads as empty.
    pub fn list(&self) -> StoreResult<Vec<Digest>> {
        let mut ids = Vec::new();
        for shard in self.shard_dirs()? {
            let shard_name = match conforming_name(&shard, SHARD_LEN) {
                Some(name) => name,
                None => {
                    warn!(path = %shard.display(), "skipping foreign entry in object store");
                    continue;
                }
            };
            for entry in fs::read_dir(&shard)? {
                let path = entry?.path();
                let rest = match conforming_name(&path, DIGEST_HEX_LEN - SHARD_LEN) {
                    Some(rest) => rest,
                    None => {
                        warn!(path = %path.display(), "skipping foreign entry in object store");
                        continue;
                    }
                };
                // The shard prefix plus the file name is the full id.
                match Digest::from_hex(&format!("{shard_name}{rest}")) {
                    Ok(id) => ids.push(id),
                    Err(_) => {
                        warn!(path = %path.display(), "skipping foreign entry in object store")
                    }
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    /// Delete an object. Returns `true` if it existed.
    ///
    /// Intended for the gc sweep only; deleting a referenced object corrupts
    /// the versions that point at it.
    pub fn remove(&self, id: &Digest) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => {
                debug!(id = %id.short_hex(), "object removed");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove shard directories left empty by [`ObjectStore::remove`].
    /// Returns how many were pruned.
    pub fn prune_empty_shards(&self) -> StoreResult<usize> {
        let mut pruned = 0;
        for shard in self.shard_dirs()? {
            if fs::read_dir(&shard)?.next().is_none() {
                fs::remove_dir(&shard)?;
                debug!(path = %shard.display(), "empty shard pruned");
                pruned += 1;
            }
        }
        Ok(pruned)
    }

    fn shard_dirs(&self) -> StoreResult<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(e) => e,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut dirs = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_dir() {
                dirs.push(path);
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn temp_file(&self) -> StoreResult<NamedTempFile> {
        // The temp file must share a filesystem with its destination for the
        // rename to stay atomic, so it lives inside the object directory.
        fs::create_dir_all(&self.root)?;
        Ok(NamedTempFile::new_in(&self.root)?)
    }

    fn persist(&self, id: &Digest, tmp: NamedTempFile) -> StoreResult<()> {
        tmp.as_file().sync_all()?;
        let dst = self.object_path(id);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        tmp.persist(&dst).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }
}

fn conforming_name(path: &Path, expected_len: usize) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    if name.len() == expected_len && name.bytes().all(|b| b.is_ascii_hexdigit()) {
        Some(name)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempdir().unwrap();
        let store = ObjectStore::open(dir.path());
        (dir, store)
    }

    // ---- addressing ----

    #[test]
    fn object_path_shards_by_two_hex_chars() {
        let (dir, store) = make_store();
        let id = Digest::of_bytes(b"hello");
        let hex = id.to_hex();
        let expected = dir
            .path()
            .join("objects")
            .join(&hex[..2])
            .join(&hex[2..]);
        assert_eq!(store.object_path(&id), expected);
    }

    // ---- write / read ----

    #[test]
    fn write_then_read_roundtrip() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"payload");
        assert!(!store.exists(&id).unwrap());
        assert!(store.write(&id, b"payload").unwrap());
        assert!(store.exists(&id).unwrap());
        assert_eq!(store.read(&id).unwrap(), b"payload");
    }

    #[test]
    fn write_is_idempotent() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"once");
        assert!(store.write(&id, b"once").unwrap());
        assert!(!store.write(&id, b"once").unwrap());
        assert_eq!(store.read(&id).unwrap(), b"once");
    }

    #[test]
    fn import_streams_a_source_file() {
        let (dir, store) = make_store();
        let src = dir.path().join("src.bin");
        let data = vec![7u8; 50_000];
        fs::write(&src, &data).unwrap();

        let id = Digest::of_bytes(&data);
        assert!(store.import(&id, &src).unwrap());
        assert!(!store.import(&id, &src).unwrap());
        assert_eq!(store.read(&id).unwrap(), data);
    }

    #[test]
    fn read_missing_object_is_not_found() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"ghost");
        assert!(matches!(store.read(&id), Err(StoreError::NotFound(got)) if got == id));
    }

    #[test]
    fn read_to_streams_content() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"streamed");
        store.write(&id, b"streamed").unwrap();

        let mut out = Vec::new();
        let n = store.read_to(&id, &mut out).unwrap();
        assert_eq!(n, 8);
        assert_eq!(out, b"streamed");
    }

    // ---- verify ----

    #[test]
    fn verify_accepts_intact_objects() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"intact");
        store.write(&id, b"intact").unwrap();
        assert!(store.verify(&id).unwrap());
    }

    #[test]
    fn verify_detects_tampering() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"original");
        store.write(&id, b"original").unwrap();
        fs::write(store.object_path(&id), b"tampered").unwrap();
        assert!(!store.verify(&id).unwrap());
    }

    // ---- list / remove / prune ----

    #[test]
    fn list_returns_all_ids_sorted() {
        let (_dir, store) = make_store();
        let mut written: Vec<Digest> = [b"a".to_vec(), b"bb".to_vec(), b"ccc".to_vec()]
            .iter()
            .map(|data| {
                let id = Digest::of_bytes(data);
                store.write(&id, data).unwrap();
                id
            })
            .collect();
        written.sort();
        assert_eq!(store.list().unwrap(), written);
    }

    #[test]
    fn list_of_empty_store_is_empty() {
        let (_dir, store) = make_store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn list_skips_foreign_files() {
        let (dir, store) = make_store();
        let id = Digest::of_bytes(b"real");
        store.write(&id, b"real").unwrap();
        fs::write(dir.path().join("objects").join(".tmp-leftover"), b"x").unwrap();
        assert_eq!(store.list().unwrap(), vec![id]);
    }

    #[test]
    fn remove_and_prune() {
        let (_dir, store) = make_store();
        let id = Digest::of_bytes(b"doomed");
        store.write(&id, b"doomed").unwrap();

        assert!(store.remove(&id).unwrap());
        assert!(!store.remove(&id).unwrap());
        assert!(!store.exists(&id).unwrap());

        assert_eq!(store.prune_empty_shards().unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
    }
}
