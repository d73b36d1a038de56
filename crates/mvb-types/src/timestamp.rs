use std::fmt;

use chrono::Local;
use serde::{Serialize, Serializer};

use crate::error::TypeError;

/// Rendered timestamp size: `YYYYMMDDhhmmss±hhmm`.
pub const TIMESTAMP_LEN: usize = 19;

const FORMAT: &str = "%Y%m%d%H%M%S%z";

/// Creation time of a version, in the fixed 19-character local-offset form
/// the index records use (e.g. `20060102150405-0700`).
///
/// The width is load-bearing: index records are addressed by byte offset and
/// embed the rendered form verbatim. Version patterns may prefix-match it.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(String);

impl Timestamp {
    /// Current wall-clock time in the local offset.
    pub fn now() -> Self {
        Self(Local::now().format(FORMAT).to_string())
    }

    /// Validate and wrap a rendered timestamp.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        let bytes = s.as_bytes();
        if bytes.len() != TIMESTAMP_LEN {
            return Err(TypeError::InvalidTimestamp(s.to_string()));
        }
        let digits_ok = bytes[..14].iter().all(u8::is_ascii_digit)
            && bytes[15..].iter().all(u8::is_ascii_digit);
        let sign_ok = bytes[14] == b'+' || bytes[14] == b'-';
        if !digits_ok || !sign_ok {
            return Err(TypeError::InvalidTimestamp(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({})", self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}
