//! Calendar date parsing for due dates and reference times
//!
//! Accepted forms:
//! - `YYYY-MM-DD` (midnight UTC)
//! - RFC 3339 (`2025-01-07T10:30:00Z`, `2025-01-07T10:30:00+02:00`)
//! - `YYYY-MM-DDTHH:MM[:SS[.fff]]` without offset (read as UTC)

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Milliseconds in one calendar day
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parses a date or timestamp into an instant, or `None` if it is not one
///
/// Every accepted form starts with a zero-padded `YYYY-MM-DD`; surrounding
/// whitespace is rejected.
pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
    if !has_date_prefix(value) {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.and_utc())
}

/// True if `value` begins with four digits, `-`, two digits, `-`, two digits
fn has_date_prefix(value: &str) -> bool {
    value.len() >= 10
        && value.as_bytes()[..10]
            .iter()
            .enumerate()
            .all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            })
}

/// Whole days from `now` until `due`, floored (negative when overdue)
pub fn days_until(due: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (due - now).num_milliseconds().div_euclid(MS_PER_DAY)
}
