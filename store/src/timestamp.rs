//! Timestamp normalization
//!
//! Exchanges hand out candle open times as epoch milliseconds. The store keys
//! duplicate detection on a second-precision calendar string derived from
//! that value, so every path that writes or compares candles goes through
//! [`TimestampZone::normalize`].

use chrono::{Local, TimeZone};
use chrono_tz::Tz;
use std::fmt::Display;

use crate::error::{Result, StoreError};

/// Output layout of a normalized timestamp.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fewest digits a raw value may have; the last three are the milliseconds.
pub const MIN_TIMESTAMP_DIGITS: usize = 4;

/// A value that can be read as epoch milliseconds.
pub trait RawTimestamp {
    fn to_raw_string(&self) -> String;
}

impl RawTimestamp for i64 {
    fn to_raw_string(&self) -> String {
        self.to_string()
    }
}

impl RawTimestamp for u64 {
    fn to_raw_string(&self) -> String {
        self.to_string()
    }
}

impl RawTimestamp for str {
    fn to_raw_string(&self) -> String {
        self.trim().to_string()
    }
}

impl RawTimestamp for String {
    fn to_raw_string(&self) -> String {
        self.as_str().to_raw_string()
    }
}

impl<T: RawTimestamp + ?Sized> RawTimestamp for &T {
    fn to_raw_string(&self) -> String {
        (**self).to_raw_string()
    }
}

/// Zone used to render normalized timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampZone {
    /// System time zone of the running process
    #[default]
    Local,
    Named(Tz),
}

impl TimestampZone {
    /// Drop the millisecond digits of `raw` and format the remaining epoch
    /// seconds as `YYYY-MM-DD HH:MM:SS` in this zone.
    pub fn normalize<T: RawTimestamp + ?Sized>(&self, raw: &T) -> Result<String> {
        let raw = raw.to_raw_string();
        let seconds = truncate_millis(&raw)?;
        let formatted = match self {
            TimestampZone::Local => format_in(&Local, seconds),
            TimestampZone::Named(tz) => format_in(tz, seconds),
        };
        let reason = "outside the representable date range";
        formatted.ok_or_else(|| StoreError::invalid_timestamp(raw, reason))
    }
}

/// Normalize in the system time zone.
pub fn normalize<T: RawTimestamp + ?Sized>(raw: &T) -> Result<String> {
    TimestampZone::Local.normalize(raw)
}

fn truncate_millis(raw: &str) -> Result<i64> {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(StoreError::invalid_timestamp(raw, "not an integer"));
    }
    if digits.len() < MIN_TIMESTAMP_DIGITS {
        return Err(StoreError::invalid_timestamp(
            raw,
            format!("expected at least {MIN_TIMESTAMP_DIGITS} digits of epoch milliseconds"),
        ));
    }

    let seconds = &raw[..raw.len() - 3];
    seconds
        .parse::<i64>()
        .map_err(|e| StoreError::invalid_timestamp(raw, e.to_string()))
}

fn format_in<Z>(zone: &Z, seconds: i64) -> Option<String>
where
    Z: TimeZone,
    Z::Offset: Display,
{
    zone.timestamp_opt(seconds, 0)
        .single()
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const UTC: TimestampZone = TimestampZone::Named(chrono_tz::UTC);

    #[test]
    fn test_normalize_utc() {
        assert_eq!(UTC.normalize(&1620000000000i64).unwrap(), "2021-05-03 00:00:00");
        assert_eq!(UTC.normalize(&1620007200000i64).unwrap(), "2021-05-03 02:00:00");
    }

    #[test]
    fn test_millis_are_truncated() {
        let base = UTC.normalize(&1620000000000i64).unwrap();
        assert_eq!(UTC.normalize(&1620000000999i64).unwrap(), base);
        assert_ne!(UTC.normalize(&1620000001000i64).unwrap(), base);
    }

    #[test]
    fn test_numeric_strings() {
        assert_eq!(UTC.normalize("1620003600000").unwrap(), "2021-05-03 01:00:00");
        assert_eq!(UTC.normalize(&" 1620003600000 ".to_string()).unwrap(), "2021-05-03 01:00:00");
        assert_eq!(UTC.normalize(&1620003600000u64).unwrap(), "2021-05-03 01:00:00");
    }

    #[test]
    fn test_named_zone_offset() {
        let tokyo = TimestampZone::Named(chrono_tz::Asia::Tokyo);
        assert_eq!(tokyo.normalize(&1620000000000i64).unwrap(), "2021-05-03 09:00:00");
    }

    #[test]
    fn test_local_is_deterministic() {
        let first = normalize(&1620000000000i64).unwrap();
        let second = normalize(&1620000000000i64).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_short_values_rejected() {
        for raw in [0i64, 7, 999, -999] {
            let err = UTC.normalize(&raw).unwrap_err();
            assert!(matches!(err, StoreError::InvalidTimestamp { .. }), "{raw}: {err}");
        }
        assert_eq!(UTC.normalize(&1000i64).unwrap(), "1970-01-01 00:00:01");
    }

    #[test]
    fn test_garbage_rejected() {
        for raw in ["", "   ", "abc", "1620000000000.0", "16200e0000000", "-"] {
            assert!(matches!(
                UTC.normalize(raw),
                Err(StoreError::InvalidTimestamp { .. })
            ));
        }
    }

    #[test]
    fn test_negative_values_truncate_toward_zero() {
        assert_eq!(UTC.normalize(&-1500i64).unwrap(), "1969-12-31 23:59:59");
    }
}
