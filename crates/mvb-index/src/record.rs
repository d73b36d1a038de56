use std::fmt;

use serde::Serialize;

use mvb_types::{Digest, Timestamp, DIGEST_HEX_LEN, TIMESTAMP_LEN};

use crate::error::{IndexError, IndexResult};

/// Byte width of one rendered record: `"<40-hex digest> <timestamp>\n"`.
pub const RECORD_LEN: usize = DIGEST_HEX_LEN + 1 + TIMESTAMP_LEN + 1;

/// One version in the index: the manifest's digest and when it was created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VersionRecord {
    pub digest: Digest,
    pub timestamp: Timestamp,
}

impl VersionRecord {
    pub fn new(digest: Digest, timestamp: Timestamp) -> Self {
        Self { digest, timestamp }
    }

    /// Rendered record including the trailing newline, always
    /// [`RECORD_LEN`] bytes.
    pub fn encode(&self) -> String {
        format!("{self}\n")
    }

    /// Parse exactly one record.
    ///
    /// Anything that is not a full, well-formed record is corruption; the
    /// index never stores partial lines.
    pub fn decode(bytes: &[u8]) -> IndexResult<Self> {
        if bytes.len() != RECORD_LEN {
            return Err(IndexError::Corrupt(format!(
                "record is {} bytes, expected {RECORD_LEN}",
                bytes.len()
            )));
        }
        if bytes[DIGEST_HEX_LEN] != b' ' || bytes[RECORD_LEN - 1] != b'\n' {
            return Err(IndexError::Corrupt("record separators missing".into()));
        }
        let text = std::str::from_utf8(&bytes[..RECORD_LEN - 1])
            .map_err(|_| IndexError::Corrupt("record is not UTF-8".into()))?;
        let digest = Digest::from_hex(&text[..DIGEST_HEX_LEN])
            .map_err(|e| IndexError::Corrupt(format!("bad digest column: {e}")))?;
        let timestamp = Timestamp::parse(&text[DIGEST_HEX_LEN + 1..])
            .map_err(|e| IndexError::Corrupt(format!("bad timestamp column: {e}")))?;
        Ok(Self { digest, timestamp })
    }

    /// Prefix match against either rendered column, the way version
    /// patterns are resolved.
    pub fn matches(&self, pattern: &str) -> bool {
        self.digest.to_hex().starts_with(pattern)
            || self.timestamp.as_str().starts_with(pattern)
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.digest, self.timestamp)
    }
}
