//! Lisp Machine time conversion: `cdate` fields are seconds since 1900-01-01,
//! POSIX time is seconds since 1970-01-01. Corresponds to `spec.md` §4.8
//! (`getattr` timestamp handling).

use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Lisp Machine epoch and the POSIX epoch.
const EPOCH_OFFSET_SECS: i64 = 2_208_988_800;

/// Converts a Lisp Machine `cdate` (seconds since 1900-01-01) to POSIX seconds
/// since 1970-01-01. A `cdate` earlier than the POSIX epoch yields a negative
/// result.
pub fn lisp_to_posix_secs(cdate: u32) -> i64 {
    cdate as i64 - EPOCH_OFFSET_SECS
}

/// Renders a `cdate` as a UTC `DateTime`, for CLI display.
pub fn lisp_to_datetime(cdate: u32) -> DateTime<Utc> {
    posix_secs_to_datetime(lisp_to_posix_secs(cdate))
}

/// Renders already-converted POSIX seconds as a UTC `DateTime`.
pub fn posix_secs_to_datetime(posix_secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(posix_secs, 0)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).single().unwrap())
}
