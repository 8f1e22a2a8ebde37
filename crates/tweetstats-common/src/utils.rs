//! Timestamp parsing and formatting helpers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{Granularity, Result, StatsError};

/// Layout used by the classic Twitter API, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TWITTER_TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

const NAIVE_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a post creation timestamp into UTC.
///
/// Offset-aware layouts (RFC 3339, the Twitter API layout, RFC 2822) are tried
/// first; naive date-times and bare dates are taken to be UTC.
pub fn parse_created_at(raw: &str) -> Result<DateTime<Utc>> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(StatsError::malformed_field("empty timestamp", "created_at"));
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(value, TWITTER_TIMESTAMP_FORMAT) {
        return Ok(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_rfc2822(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(StatsError::malformed_field(format!("unrecognized timestamp '{value}'"), "created_at"))
}

/// Formats a timestamp for display.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Formats a period start the way axis labels and the console report show it.
pub fn format_period(period_start: DateTime<Utc>, granularity: Granularity) -> String {
    period_start.format(granularity.label_format()).to_string()
}
