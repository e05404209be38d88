//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Current UTC time as an RFC 3339 string with millisecond precision
///
/// Used for every timestamp written into change records, errors and cache rows,
/// so lexical ordering matches chronological ordering.
pub fn now_rfc3339() -> String {
    to_rfc3339(&now())
}

/// Format a timestamp the same way `now_rfc3339` does
pub fn to_rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
