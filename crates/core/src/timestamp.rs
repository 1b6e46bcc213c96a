//! Timestamp validation for record and payment dates
//!
//! Dates are stored as strings in records (they are part of the hash input)
//! and only parsed when a rule needs to compare them.
//!
//! Accepted forms:
//! - RFC 3339 with `Z` or a numeric offset: `2024-01-15T10:00:00Z`
//! - Naive date-time, read as UTC: `2024-01-15T10:00:00`, `2024-01-15T10:00:00.250`
//! - Plain date, read as midnight UTC: `2024-02-01`

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid timestamp: {0:?}")]
    Invalid(String),
}

/// Parse a timestamp string into a UTC instant.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, TimestampError> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampError::Invalid(input.to_string()))
}

/// Check whether a string is an accepted timestamp
pub fn is_timestamp(input: &str) -> bool {
    parse_timestamp(input).is_ok()
}

/// Current UTC time, RFC 3339 with microseconds and a `Z` suffix
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_zulu() {
        let dt = parse_timestamp("2024-01-15T10:00:00Z").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_offset_normalizes_to_utc() {
        let dt = parse_timestamp("2024-01-15T07:00:00-03:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_as_utc() {
        let dt = parse_timestamp("2024-01-15T10:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_date_only() {
        let dt = parse_timestamp("2024-02-01").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_timestamps() {
        assert!(!is_timestamp(""));
        assert!(!is_timestamp("yesterday"));
        assert!(!is_timestamp("2024-13-01T00:00:00Z"));
        assert!(!is_timestamp("2024-02-30"));
    }

    #[test]
    fn test_now_timestamp_roundtrip() {
        let now = now_timestamp();
        assert!(now.ends_with('Z'));
        assert!(is_timestamp(&now));
    }
}
