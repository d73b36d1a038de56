use thiserror::Error;

/// Errors from parsing or constructing foundation types.
#[derive(Debug, Error)]
pub enum TypeError {
    /// A string could not be decoded as hexadecimal.
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Decoded bytes had the wrong length.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A timestamp string did not match `YYYYMMDDhhmmss±hhmm`.
    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}
