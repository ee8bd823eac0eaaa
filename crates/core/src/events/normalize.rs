//! Status and time normalization
//!
//! Both functions are pure apart from reading the wall clock for `"now"`.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use faros_domain::TestStatus;

/// Map a raw status string onto the canonical status set.
///
/// Matching is case-insensitive; unknown values become `Custom`.
pub fn normalize_status(raw: &str) -> TestStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "success" | "succeed" | "succeeded" | "pass" | "passed" => TestStatus::Success,
        "fail" | "failed" | "failure" => TestStatus::Failure,
        "skip" | "skipped" | "disable" | "disabled" => TestStatus::Skipped,
        _ => TestStatus::Custom,
    }
}

/// Normalize a caller-supplied time against the current instant.
pub fn normalize_time(raw: &str) -> String {
    normalize_time_at(raw, Utc::now())
}

/// Normalize a time string:
///
/// - `"now"` (any case) becomes `now`
/// - all digits is read as epoch milliseconds
/// - anything else passes through untouched
pub fn normalize_time_at(raw: &str, now: DateTime<Utc>) -> String {
    if raw.eq_ignore_ascii_case("now") {
        return to_iso(now);
    }
    if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
        let instant =
            raw.parse::<i64>().ok().and_then(DateTime::<Utc>::from_timestamp_millis);
        if let Some(instant) = instant {
            return to_iso(instant);
        }
    }
    raw.to_string()
}

/// Parse a runner timestamp: RFC 3339, or ISO-8601 without an offset read
/// as UTC (the usual JUnit form).
pub fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    let timestamp = timestamp.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Add a duration in milliseconds to a timestamp accepted by
/// [`parse_timestamp`].
///
/// Returns `None` when the timestamp does not parse.
pub fn offset_time(timestamp: &str, duration_ms: u64) -> Option<String> {
    let start = parse_timestamp(timestamp)?;
    let offset = chrono::Duration::milliseconds(i64::try_from(duration_ms).ok()?);
    start.checked_add_signed(offset).map(to_iso)
}

/// ISO-8601 with millisecond precision and a `Z` suffix.
pub fn to_iso(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
