//! Lenient timestamp deserialization.
//!
//! New records store RFC 3339 timestamps. Older records store local
//! `YYYY-MM-DD HH:MM:SS` strings without an offset; those are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse either an RFC 3339 timestamp or the legacy naive format.
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, LEGACY_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// `deserialize_with` target for required timestamps.
pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'")))
}

/// `deserialize_with` target for optional timestamps.
pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) if raw.is_empty() => Ok(None),
        Some(raw) => parse(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{raw}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2024-03-05T10:20:30+02:00").unwrap();
        assert_eq!(dt.hour(), 8);
    }

    #[test]
    fn test_parse_legacy_format() {
        let dt = parse("2023-11-02 14:05:09").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2023, 11, 2));
        assert_eq!(dt.second(), 9);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse("yesterday").is_none());
    }
}
