//! Date helper functions

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Format a front-matter date as `YYYY.MM.DD`.
///
/// Dates that cannot be parsed are returned unchanged.
///
/// # Examples
/// ```ignore
/// format_date("2024-01-15") // -> "2024.01.15"
/// ```
pub fn format_date(s: &str) -> String {
    match parse_date(s) {
        Some(date) => date.format("%Y.%m.%d").to_string(),
        None => s.to_string(),
    }
}

/// Parse a date string in various formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive())
}
