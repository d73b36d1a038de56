use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{IndexError, IndexResult};
use crate::record::{VersionRecord, RECORD_LEN};

/// Name of the index file under a store root.
pub const INDEX_FILE: &str = "index";

const RECORD_LEN_U64: u64 = RECORD_LEN as u64;

/// The append-only version log.
///
/// Stateless handle over the `index` file: every operation opens the file on
/// its own, which keeps the single-writer contract with the caller instead
/// of a long-lived handle. A missing file reads as an empty index; a file
/// whose length is not a record multiple is corrupt and every operation
/// refuses it.
#[derive(Debug, Clone)]
pub struct VersionIndex {
    path: PathBuf,
}

/// Indexed addressing (`v<k>` forms): positive `k` counts 1-based from the
/// oldest record, `k <= 0` counts back from the newest (`v0` is the newest).
pub fn parse_indexed_pattern(pattern: &str) -> Option<i64> {
    pattern.strip_prefix('v')?.parse().ok()
}

fn indexed_to_position(k: i64, count: i64) -> Option<usize> {
    let i = if k > 0 { k - 1 } else { count - 1 + k };
    (i >= 0 && i < count).then_some(i as usize)
}

impl VersionIndex {
    /// Handle on the index under `store_root`. Does not touch the
    /// filesystem.
    pub fn open(store_root: impl AsRef<Path>) -> Self {
        Self {
            path: store_root.as_ref().join(INDEX_FILE),
        }
    }

    /// Number of records.
    pub fn count(&self) -> IndexResult<usize> {
        Ok((self.size()? / RECORD_LEN_U64) as usize)
    }

    /// Record `i` (0-based, chronological), via direct offset seek.
    pub fn record_at(&self, i: usize) -> IndexResult<VersionRecord> {
        let size = self.size()?;
        let offset = i as u64 * RECORD_LEN_U64;
        if offset >= size {
            return Err(IndexError::NotFound(format!("record {i}")));
        }
        let mut f = File::open(&self.path)?;
        f.seek(SeekFrom::Start(offset))?;
        let mut buf = [0u8; RECORD_LEN];
        f.read_exact(&mut buf)?;
        VersionRecord::decode(&buf)
    }

    /// The newest record, if any.
    pub fn latest(&self) -> IndexResult<Option<VersionRecord>> {
        match self.count()? {
            0 => Ok(None),
            n => self.record_at(n - 1).map(Some),
        }
    }

    /// Append one record. Single writer by contract.
    pub fn append(&self, record: &VersionRecord) -> IndexResult<()> {
        // Refuse to grow a file that is already out of shape.
        self.size()?;
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        f.write_all(record.encode().as_bytes())?;
        f.sync_all()?;
        debug!(digest = %record.digest.short_hex(), "index record appended");
        Ok(())
    }

    /// All records in chronological order.
    pub fn records(&self) -> IndexResult<Vec<VersionRecord>> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if data.len() % RECORD_LEN != 0 {
            return Err(IndexError::Corrupt(format!(
                "index length {} is not a multiple of {RECORD_LEN}",
                data.len()
            )));
        }
        data.chunks_exact(RECORD_LEN)
            .map(VersionRecord::decode)
            .collect()
    }

    /// Iterate newest-first without loading the whole file; the default
    /// listing order.
    pub fn iter_rev(&self) -> IndexResult<ReverseIter> {
        let size = self.size()?;
        if size == 0 {
            return Ok(ReverseIter {
                file: None,
                offset: 0,
            });
        }
        Ok(ReverseIter {
            file: Some(File::open(&self.path)?),
            offset: size,
        })
    }

    /// Linear scan for records whose digest or timestamp starts with
    /// `pattern`.
    pub fn find_by_prefix(&self, pattern: &str) -> IndexResult<Vec<VersionRecord>> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|r| r.matches(pattern))
            .collect())
    }

    /// Resolve an indexed form (`v<k>`). Out of range is NotFound.
    pub fn resolve_indexed(&self, k: i64) -> IndexResult<VersionRecord> {
        let count = self.count()? as i64;
        let i = indexed_to_position(k, count)
            .ok_or_else(|| IndexError::NotFound(format!("v{k}")))?;
        self.record_at(i)
    }

    /// Resolve a user-supplied version argument to exactly one record:
    /// `v<k>` forms by position, anything else by prefix search with zero
    /// matches → NotFound and several → Ambiguous.
    pub fn resolve(&self, pattern: &str) -> IndexResult<VersionRecord> {
        if let Some(k) = parse_indexed_pattern(pattern) {
            return self.resolve_indexed(k);
        }
        let mut matches = self.find_by_prefix(pattern)?;
        match matches.len() {
            0 => Err(IndexError::NotFound(pattern.to_string())),
            1 => Ok(matches.swap_remove(0)),
            count => Err(IndexError::Ambiguous {
                pattern: pattern.to_string(),
                count,
            }),
        }
    }

    /// Delete every record matching `pattern` in one pass: non-matching
    /// records are rewritten at the lowest free offset and the file is
    /// truncated to the surviving length. Safe for zero or all matches.
    /// Returns how many records were removed.
    pub fn delete_matching(&self, pattern: &str) -> IndexResult<usize> {
        let size = self.size()?;
        if size == 0 {
            return Ok(0);
        }
        let mut f = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let mut buf = [0u8; RECORD_LEN];
        let mut r = 0u64;
        let mut w = 0u64;
        let mut removed = 0usize;
        while r < size {
            f.seek(SeekFrom::Start(r))?;
            f.read_exact(&mut buf)?;
            let record = VersionRecord::decode(&buf)?;
            r += RECORD_LEN_U64;
            if record.matches(pattern) {
                removed += 1;
                continue;
            }
            if r - RECORD_LEN_U64 != w {
                f.seek(SeekFrom::Start(w))?;
                f.write_all(&buf)?;
            }
            w += RECORD_LEN_U64;
        }
        f.set_len(w)?;
        f.sync_all()?;
        if removed > 0 {
            info!(pattern, removed, "index records deleted");
        }
        Ok(removed)
    }

    /// Delete the single record addressed by the indexed form `v<k>`,
    /// compacting the tail down. Returns the removed record.
    pub fn delete_indexed(&self, k: i64) -> IndexResult<VersionRecord> {
        let count = self.count()? as i64;
        let i = indexed_to_position(k, count)
            .ok_or_else(|| IndexError::NotFound(format!("v{k}")))?;
        let removed = self.record_at(i)?;

        let size = count as u64 * RECORD_LEN_U64;
        let mut f = OpenOptions::new().read(true).write(true).open(&self.path)?;
        let mut buf = [0u8; RECORD_LEN];
        let mut r = (i as u64 + 1) * RECORD_LEN_U64;
        let mut w = i as u64 * RECORD_LEN_U64;
        while r < size {
            f.seek(SeekFrom::Start(r))?;
            f.read_exact(&mut buf)?;
            f.seek(SeekFrom::Start(w))?;
            f.write_all(&buf)?;
            r += RECORD_LEN_U64;
            w += RECORD_LEN_U64;
        }
        f.set_len(w)?;
        f.sync_all()?;
        info!(digest = %removed.digest.short_hex(), position = i, "index record deleted");
        Ok(removed)
    }

    fn size(&self) -> IndexResult<u64> {
        let len = match fs::metadata(&self.path) {
            Ok(m) => m.len(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => return Err(e.into()),
        };
        if len % RECORD_LEN_U64 != 0 {
            return Err(IndexError::Corrupt(format!(
                "index length {len} is not a multiple of {RECORD_LEN}"
            )));
        }
        Ok(len)
    }
}

/// Backward reader over the index file, yielding records newest-first.
pub struct ReverseIter {
    file: Option<File>,
    offset: u64,
}

impl Iterator for ReverseIter {
    type Item = IndexResult<VersionRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let file = self.file.as_mut()?;
        if self.offset == 0 {
            return None;
        }
        self.offset -= RECORD_LEN_U64;
        let mut buf = [0u8; RECORD_LEN];
        if let Err(e) = file.seek(SeekFrom::Start(self.offset)) {
            self.file = None;
            return Some(Err(e.into()));
        }
        if let Err(e) = file.read_exact(&mut buf) {
            self.file = None;
            return Some(Err(e.into()));
        }
        Some(VersionRecord::decode(&buf))
    }
}
