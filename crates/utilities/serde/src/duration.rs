//! Human readable [`Duration`] serialization helpers.
//!
//! Use with `#[serde(with = "offramp_serde::duration")]`. Durations are written in
//! [`humantime`] notation (`"8h"`, `"1m 30s"`, `"250ms"`). Deserialization accepts any string
//! [`humantime::parse_duration`] understands, or a bare number of seconds.

use core::time::Duration;
use serde::{Deserialize, Deserializer, Serializer, de};
use serde_json::Value;

/// Serializes a [`Duration`] as a string such as `"30s"`.
pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*value))
}

/// Deserializes a [`Duration`] from a humantime string or a number of seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => parse(&s).map_err(de::Error::custom),
        Value::Number(num) => num
            .as_u64()
            .map(Duration::from_secs)
            .ok_or_else(|| de::Error::custom("duration seconds must be a non-negative integer")),
        _ => Err(de::Error::custom("only string and number types are supported")),
    }
}

/// Parses a duration such as `"8h"`, `"15m"`, `"10s"` or `"1s 500ms"`.
pub fn parse(s: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(s.trim())
}
