use std::fmt;
use std::io::{self, Read};

use serde::{Serialize, Serializer};
use sha1::{Digest as _, Sha1};

use crate::error::TypeError;

/// Raw digest size in bytes.
pub const DIGEST_LEN: usize = 20;

/// Rendered digest size in hex characters. Every external format (object
/// paths, index records, manifest lines) fixes this width.
pub const DIGEST_HEX_LEN: usize = DIGEST_LEN * 2;

/// Content-addressed identifier: SHA-1 hash of a byte stream.
///
/// A digest is the unit of deduplication. Two files with the same digest are
/// stored once; a version is identified by the digest of its manifest text.
/// The 40-hex rendering is load-bearing: object shard paths, the fixed-width
/// index, and manifest columns all assume it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Digest of a byte slice held fully in memory.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(data);
        Self(hasher.finalize().into())
    }

    /// Digest of a reader, computed streaming in fixed-size chunks.
    ///
    /// Equal to [`Digest::of_bytes`] over the reader's full content.
    pub fn of_reader<R: Read>(mut reader: R) -> io::Result<Self> {
        let mut hasher = Sha1::new();
        let mut buf = [0u8; 8192];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(Self(hasher.finalize().into()))
    }

    /// Wrap an already-computed 20-byte hash.
    pub fn from_raw(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// The raw hash bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Full 40-character lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Abbreviated hex (first 4 bytes) for log lines and debug output.
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|_| TypeError::InvalidHex(s.to_string()))?;
        if bytes.len() != DIGEST_LEN {
            return Err(TypeError::InvalidLength {
                expected: DIGEST_LEN,
                actual: bytes.len(),
            });
        }
        let mut raw = [0u8; DIGEST_LEN];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self.short_hex())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; DIGEST_LEN]> for Digest {
    fn from(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Rendered as a hex string so JSON output stays human-readable.
impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- hashing ----

    #[test]
    fn of_bytes_known_vector() {
        let d = Digest::of_bytes(b"hello");
        assert_eq!(d.to_hex(), "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[test]
    fn of_bytes_empty_input() {
        let d = Digest::of_bytes(b"");
        assert_eq!(d.to_hex(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn of_bytes_is_deterministic() {
        assert_eq!(Digest::of_bytes(b"data"), Digest::of_bytes(b"data"));
        assert_ne!(Digest::of_bytes(b"data"), Digest::of_bytes(b"datb"));
    }

    #[test]
    fn of_reader_matches_of_bytes() {
        let data = vec![0xabu8; 100_000];
        let streamed = Digest::of_reader(&data[..]).unwrap();
        assert_eq!(streamed, Digest::of_bytes(&data));
    }

    // ---- hex rendering ----

    #[test]
    fn hex_roundtrip() {
        let d = Digest::of_bytes(b"roundtrip");
        let parsed = Digest::from_hex(&d.to_hex()).unwrap();
        assert_eq!(d, parsed);
    }

    #[test]
    fn from_hex_rejects_garbage() {
        assert!(matches!(
            Digest::from_hex("not hex at all"),
            Err(TypeError::InvalidHex(_))
        ));
    }

    #[test]
    fn from_hex_rejects_wrong_length() {
        assert!(matches!(
            Digest::from_hex("abcd"),
            Err(TypeError::InvalidLength {
                expected: 20,
                actual: 2
            })
        ));
    }

    #[test]
    fn display_is_full_hex_debug_is_short() {
        let d = Digest::of_bytes(b"hello");
        assert_eq!(format!("{d}"), d.to_hex());
        assert_eq!(format!("{d:?}"), format!("Digest({})", d.short_hex()));
        assert_eq!(d.short_hex().len(), 8);
    }

    #[test]
    fn serializes_as_hex_string() {
        let d = Digest::of_bytes(b"hello");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, format!("\"{}\"", d.to_hex()));
    }
}
