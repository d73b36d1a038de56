//! Manifest text codec for mvb.
//!
//! A manifest is the serialized form of one snapshot: one line per entry,
//! sorted by path, `"<40-hex digest> <40-hex fingerprint> <path>\n"`, with
//! directories carrying all-space sentinel columns. The manifest text is
//! itself stored as a content-addressed object and its digest is the
//! version id, so encoding must be byte-deterministic: same entries, same
//! text, same id.

pub mod codec;
pub mod error;

pub use codec::{decode, decode_bytes, encode, encode_entry};
pub use error::{ManifestError, ManifestResult};
