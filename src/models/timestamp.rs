//! ISO-8601 timestamp serde helpers for the idea log.
//!
//! Timestamps are written as RFC 3339. Older logs carry naive local
//! timestamps (`2024-05-01T09:30:00.123456`); those are read as UTC.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(serde::de::Error::custom)
}

/// Parse an RFC 3339 timestamp, falling back to a naive ISO-8601 one.
pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("Invalid ISO-8601 timestamp '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339() {
        let dt = parse("2025-03-01T10:15:00+00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T10:15:00+00:00");
    }

    #[test]
    fn test_parse_naive_legacy_timestamp() {
        let dt = parse("2024-05-01T09:30:00.123456").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2024-05-01 09:30");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("yesterday").is_err());
    }
}
