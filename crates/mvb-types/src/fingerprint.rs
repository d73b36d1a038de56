use std::time::SystemTime;

use chrono::{DateTime, Utc};

use crate::digest::Digest;

/// Hash of a file's (path, modification time, size) tuple.
///
/// A cheap "possibly changed" signal: equal fingerprints are taken to mean
/// unchanged content only through the fast cache, never for object
/// addressing. The mtime contribution is the UTC epoch second/nanosecond
/// pair, so the result does not depend on the scanning host's timezone.
pub fn metadata_fingerprint(path: &str, mtime: SystemTime, size: u64) -> Digest {
    let at: DateTime<Utc> = mtime.into();
    let input = format!(
        "{path}\n{}.{:09}\n{size}\n",
        at.timestamp(),
        at.timestamp_subsec_nanos()
    );
    Digest::of_bytes(input.as_bytes())
}
