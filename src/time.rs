//! Time related utils.

use chrono::SecondsFormat;
use chrono::Utc;

/// The timestamp type used by all signers.
pub type DateTime = chrono::DateTime<Utc>;

/// Return the current UTC time.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into date: `20220301`
pub fn format_date(t: DateTime) -> String {
    t.format("%Y%m%d").to_string()
}

/// Format time into ISO8601: `20220313T072004Z`
pub fn format_iso8601(t: DateTime) -> String {
    t.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Format time into millisecond ISO8601: `2022-03-13T07:20:04.123Z`
///
/// This is the exact shape the legacy protocol sends in the `Date` header.
pub fn format_iso8601_millis(t: DateTime) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}
