use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use mvb_types::{metadata_fingerprint, sort_entries, Digest, FileEntry};

use crate::cache::FastCache;
use crate::error::{ScanError, ScanResult};
use crate::pool::worker_pool;

/// A walked file awaiting its content digest.
struct PendingFile {
    rel: String,
    abs: PathBuf,
    mtime: SystemTime,
    size: u64,
}

/// Scan `root` into a sorted entry list.
///
/// The walk itself is sequential; per-file fingerprint and content-digest
/// work is fanned out across `workers` threads and joined before the final
/// sort. With a `cache`, files whose fingerprint is known reuse the cached
/// digest without touching their content (see [`FastCache`]); without one,
/// every file is hashed in full.
///
/// Fail-fast: the first worker error aborts the scan, because a partial
/// entry list would serialize to a manifest that silently drops files.
pub fn scan(root: &Path, workers: usize, cache: Option<&FastCache>) -> ScanResult<Vec<FileEntry>> {
    let mut entries = Vec::new();
    let mut pending = Vec::new();

    for item in WalkDir::new(root).min_depth(1) {
        let item = item?;
        let rel = relative_slash_path(root, item.path())?;
        if item.file_type().is_dir() {
            entries.push(FileEntry::dir(format!("{rel}/")));
        } else {
            let meta = item.metadata()?;
            pending.push(PendingFile {
                rel,
                abs: item.path().to_path_buf(),
                mtime: meta.modified()?,
                size: meta.len(),
            });
        }
    }
    debug!(
        root = %root.display(),
        dirs = entries.len(),
        files = pending.len(),
        "walk complete"
    );

    let pool = worker_pool(workers)?;
    let hashed = pool.install(|| {
        pending
            .par_iter()
            .map(|file| digest_one(file, cache))
            .collect::<ScanResult<Vec<FileEntry>>>()
    })?;

    entries.extend(hashed);
    sort_entries(&mut entries);
    Ok(entries)
}

fn digest_one(file: &PendingFile, cache: Option<&FastCache>) -> ScanResult<FileEntry> {
    let fingerprint = metadata_fingerprint(&file.rel, file.mtime, file.size);
    let digest = match cache.and_then(|c| c.lookup(&fingerprint)) {
        Some(digest) => {
            debug!(path = %file.rel, "fast cache hit");
            digest
        }
        None => Digest::of_reader(File::open(&file.abs)?)?,
    };
    Ok(FileEntry::file(file.rel.clone(), fingerprint, digest))
}

/// Path relative to `root`, slash-separated regardless of platform.
fn relative_slash_path(root: &Path, path: &Path) -> ScanResult<String> {
    let rel = path
        .strip_prefix(root)
        .map_err(|_| ScanError::OutsideRoot(path.to_path_buf()))?;
    let mut parts = Vec::new();
    for component in rel.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => return Err(ScanError::NonUtf8Path(path.to_path_buf())),
        }
    }
    Ok(parts.join("/"))
}
