//! UTC day-boundary helpers.
//!
//! Every consumer that needs to know whether a timestamp belongs to "today"
//! goes through these functions so the rollover rule lives in one place.

use chrono::{DateTime, Duration, NaiveTime, SecondsFormat, TimeZone, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TimestampError {
    #[error("Invalid RFC 3339 timestamp {value:?}: {source}")]
    Invalid {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// 00:00:00.000 UTC on the calendar day of `now`
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&now.date_naive().and_time(NaiveTime::MIN))
}

/// Whether `t` falls on the same UTC year/month/day as `now`
pub fn is_same_utc_day(t: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    t.date_naive() == now.date_naive()
}

/// Resolve a stored watermark against the current day.
///
/// A missing watermark, or one whose UTC date is not today's, collapses to
/// the start of the current UTC day. Evaluated on every read so a process
/// that starts late on a new day corrects itself without waiting for
/// midnight.
pub fn reset_if_stale_day(watermark: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    match watermark {
        Some(w) if is_same_utc_day(w, now) => w,
        _ => start_of_utc_day(now),
    }
}

/// The first UTC midnight strictly after `now`
pub fn next_utc_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    start_of_utc_day(now) + Duration::days(1)
}

/// RFC 3339 with a `Z` suffix.
///
/// At least millisecond precision; finer digits are kept when present so
/// that `parse_timestamp(format_timestamp(t)) == t` for every `t`.
pub fn format_timestamp(t: DateTime<Utc>) -> String {
    let format = if t.timestamp_subsec_nanos() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    t.to_rfc3339_opts(format, true)
}

/// Parse any RFC 3339 timestamp and normalize it to UTC
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, TimestampError> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| TimestampError::Invalid {
            value: value.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_start_of_utc_day() {
        let now = utc(2025, 6, 1, 17, 45, 12) + Duration::milliseconds(345);
        assert_eq!(start_of_utc_day(now), utc(2025, 6, 1, 0, 0, 0));
        assert_eq!(start_of_utc_day(utc(2025, 6, 1, 0, 0, 0)), utc(2025, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_is_same_utc_day() {
        let now = utc(2025, 6, 1, 12, 0, 0);
        assert!(is_same_utc_day(utc(2025, 6, 1, 0, 0, 0), now));
        assert!(is_same_utc_day(utc(2025, 6, 1, 23, 59, 59), now));
        assert!(!is_same_utc_day(utc(2025, 5, 31, 23, 59, 59), now));
        assert!(!is_same_utc_day(utc(2025, 6, 2, 0, 0, 0), now));
        // Same day-of-month, different month
        assert!(!is_same_utc_day(utc(2025, 7, 1, 12, 0, 0), now));
    }

    #[test]
    fn test_non_utc_offset_compares_in_utc() {
        // 2025-06-01T23:30:00-02:00 is 2025-06-02T01:30:00Z
        let t = parse_timestamp("2025-06-01T23:30:00-02:00").unwrap();
        assert!(is_same_utc_day(t, utc(2025, 6, 2, 8, 0, 0)));
        assert!(!is_same_utc_day(t, utc(2025, 6, 1, 8, 0, 0)));
    }

    #[test]
    fn test_reset_if_stale_day_keeps_todays_watermark() {
        let now = utc(2025, 6, 1, 12, 0, 0);
        let w = utc(2025, 6, 1, 11, 30, 0);
        assert_eq!(reset_if_stale_day(Some(w), now), w);
    }

    #[test]
    fn test_reset_if_stale_day_resets_yesterday() {
        let now = utc(2025, 6, 1, 0, 5, 0);
        let w = utc(2025, 5, 31, 23, 59, 0);
        assert_eq!(reset_if_stale_day(Some(w), now), utc(2025, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_reset_if_stale_day_missing() {
        let now = utc(2025, 6, 1, 9, 0, 0);
        assert_eq!(reset_if_stale_day(None, now), utc(2025, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_reset_if_stale_day_future_day() {
        // Clock skew: a watermark from tomorrow would hide every trade today
        let now = utc(2025, 6, 1, 9, 0, 0);
        let w = utc(2025, 6, 2, 0, 10, 0);
        assert_eq!(reset_if_stale_day(Some(w), now), utc(2025, 6, 1, 0, 0, 0));
    }

    #[test]
    fn test_next_utc_midnight() {
        assert_eq!(
            next_utc_midnight(utc(2025, 12, 31, 18, 0, 0)),
            utc(2026, 1, 1, 0, 0, 0)
        );
        // Exactly at midnight the next one is a full day away
        assert_eq!(
            next_utc_midnight(utc(2025, 6, 1, 0, 0, 0)),
            utc(2025, 6, 2, 0, 0, 0)
        );
    }

    #[test]
    fn test_format_and_parse_timestamp() {
        let t = utc(2025, 6, 1, 8, 15, 30) + Duration::milliseconds(7);
        let s = format_timestamp(t);
        assert_eq!(s, "2025-06-01T08:15:30.007Z");
        assert_eq!(parse_timestamp(&s).unwrap(), t);
        assert_eq!(parse_timestamp("  2025-06-01T08:15:30Z\n").unwrap(), utc(2025, 6, 1, 8, 15, 30));
    }

    #[test]
    fn test_format_timestamp_keeps_sub_millisecond_digits() {
        let micros = utc(2025, 6, 1, 10, 0, 0) + Duration::microseconds(500);
        assert_eq!(format_timestamp(micros), "2025-06-01T10:00:00.000500Z");
        assert_eq!(parse_timestamp(&format_timestamp(micros)).unwrap(), micros);

        let nanos = utc(2025, 6, 1, 10, 0, 0) + Duration::nanoseconds(123_456_789);
        assert_eq!(format_timestamp(nanos), "2025-06-01T10:00:00.123456789Z");
        assert_eq!(parse_timestamp(&format_timestamp(nanos)).unwrap(), nanos);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        let err = parse_timestamp("yesterday").unwrap_err();
        assert!(err.to_string().contains("yesterday"));
        assert!(parse_timestamp("").is_err());
    }
}
