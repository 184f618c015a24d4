//! Timestamp formatting for rule audit and cutover times.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Display format for rule timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format epoch milliseconds in the local time zone.
pub fn format_timestamp_millis(millis: i64) -> String {
    format_timestamp_millis_in(millis, &Local)
}

/// Format epoch milliseconds in the given time zone.
///
/// Returns "-" for timestamps outside chrono's representable range.
pub fn format_timestamp_millis_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => "-".to_string(),
    }
}

/// Parse a local timestamp in `TIMESTAMP_FORMAT` back to epoch milliseconds.
pub fn parse_timestamp_millis(s: &str) -> Option<i64> {
    parse_timestamp_millis_in(s, &Local)
}

/// Parse a timestamp in `TIMESTAMP_FORMAT` in the given time zone.
///
/// Returns None for blank or malformed input and for local times that are
/// ambiguous or skipped by a DST transition.
pub fn parse_timestamp_millis_in<Tz: TimeZone>(s: &str, tz: &Tz) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .ok()
        .and_then(|dt| tz.from_local_datetime(&dt).single())
        .map(|dt| dt.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_format_timestamp_millis_utc() {
        assert_eq!(
            format_timestamp_millis_in(1_700_000_000_000, &Utc),
            "2023-11-14 22:13:20"
        );
        assert_eq!(format_timestamp_millis_in(0, &Utc), "1970-01-01 00:00:00");
    }

    #[test]
    fn test_format_is_pure() {
        let a = format_timestamp_millis(1_600_000_000_123);
        let b = format_timestamp_millis(1_600_000_000_123);
        assert_eq!(a, b);
    }

    #[test]
    fn test_format_with_offset() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(
            format_timestamp_millis_in(1_700_000_000_000, &tz),
            "2023-11-14 23:13:20"
        );
    }

    #[test]
    fn test_format_out_of_range() {
        assert_eq!(format_timestamp_millis_in(i64::MAX, &Utc), "-");
    }

    #[test]
    fn test_parse_timestamp_millis() {
        assert_eq!(
            parse_timestamp_millis_in("2023-11-14 22:13:20", &Utc),
            Some(1_700_000_000_000)
        );
        assert_eq!(parse_timestamp_millis_in("  ", &Utc), None);
        assert_eq!(parse_timestamp_millis_in("yesterday", &Utc), None);
    }

    #[test]
    fn test_parse_inverts_format() {
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let formatted = format_timestamp_millis_in(1_650_000_000_000, &tz);
        assert_eq!(
            parse_timestamp_millis_in(&formatted, &tz),
            Some(1_650_000_000_000)
        );
    }
}
