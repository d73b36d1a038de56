use mvb_types::{Digest, FileEntry, DIGEST_HEX_LEN};

use crate::error::{ManifestError, ManifestResult};

/// All-space sentinel rendered in both digest columns of a directory entry.
const EMPTY_COLUMN: &str = "                                        ";

/// Byte offset of the fingerprint column within a line.
const FINGERPRINT_COL: usize = DIGEST_HEX_LEN + 1;

/// Byte offset of the path column within a line.
const PATH_COL: usize = FINGERPRINT_COL + DIGEST_HEX_LEN + 1;

/// Render a sorted entry list as manifest text.
///
/// The caller guarantees the list invariant (unique paths, ascending);
/// [`decode`] enforces it on the way back in.
pub fn encode(entries: &[FileEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&encode_entry(entry));
    }
    out
}

/// Render a single entry as its manifest line (trailing newline included).
pub fn encode_entry(entry: &FileEntry) -> String {
    match (entry.digest, entry.fingerprint) {
        (Some(digest), Some(fingerprint)) => {
            format!("{digest} {fingerprint} {}\n", entry.path)
        }
        _ => format!("{EMPTY_COLUMN} {EMPTY_COLUMN} {}\n", entry.path),
    }
}

/// Parse manifest text back into its entry list.
///
/// Strict: fixed column offsets, sentinel columns exactly on directory
/// entries, paths unique and ascending. Anything else is corruption --
/// manifests are machine-written and never edited in place.
pub fn decode(text: &str) -> ManifestResult<Vec<FileEntry>> {
    if !text.is_empty() && !text.ends_with('\n') {
        return Err(ManifestError::Corrupt {
            line: text.lines().count(),
            reason: "missing trailing newline".into(),
        });
    }

    let mut entries: Vec<FileEntry> = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let line_no = i + 1;
        let entry = decode_line(line).map_err(|reason| ManifestError::Corrupt {
            line: line_no,
            reason,
        })?;
        if let Some(prev) = entries.last() {
            if prev.path >= entry.path {
                return Err(ManifestError::Corrupt {
                    line: line_no,
                    reason: format!("path {:?} out of order after {:?}", entry.path, prev.path),
                });
            }
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Parse a manifest object as read back from the store.
pub fn decode_bytes(data: &[u8]) -> ManifestResult<Vec<FileEntry>> {
    let text = std::str::from_utf8(data).map_err(|_| ManifestError::NotText)?;
    decode(text)
}

fn decode_line(line: &str) -> Result<FileEntry, String> {
    let bytes = line.as_bytes();
    if bytes.len() <= PATH_COL {
        return Err(format!("line is {} bytes, expected more than {PATH_COL}", bytes.len()));
    }
    // Keeps the fixed-offset slicing below on char boundaries.
    if !bytes[..PATH_COL].is_ascii() {
        return Err("non-ASCII bytes in digest columns".into());
    }
    if bytes[DIGEST_HEX_LEN] != b' ' || bytes[PATH_COL - 1] != b' ' {
        return Err("column separators missing".into());
    }

    let digest = decode_column(&line[..DIGEST_HEX_LEN])?;
    let fingerprint = decode_column(&line[FINGERPRINT_COL..FINGERPRINT_COL + DIGEST_HEX_LEN])?;
    let path = &line[PATH_COL..];

    match (digest, fingerprint, path.ends_with('/')) {
        (Some(digest), Some(fingerprint), false) => {
            Ok(FileEntry::file(path, fingerprint, digest))
        }
        (None, None, true) => Ok(FileEntry::dir(path)),
        (None, None, false) => Err(format!("sentinel columns on file entry {path:?}")),
        _ => Err(format!("mismatched digest columns for {path:?}")),
    }
}

fn decode_column(column: &str) -> Result<Option<Digest>, String> {
    if column == EMPTY_COLUMN {
        return Ok(None);
    }
    Digest::from_hex(column)
        .map(Some)
        .map_err(|e| format!("bad digest column: {e}"))
}
