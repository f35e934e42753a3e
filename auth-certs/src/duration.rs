//! Duration-second fields.
//!
//! Lease durations arrive either as an integer number of seconds (`3600`) or as
//! a duration string built from number/unit segments (`60m`, `1h30m`, `-5s`).
//! Both normalize to whole seconds. Negative values are preserved so that the
//! registry can reject them with its own message.

use crate::error::{CertAuthError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

/// A lease duration as supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationInput {
    Seconds(i64),
    Text(String),
}

impl DurationInput {
    /// Resolve the input to whole seconds, truncating sub-second remainders.
    pub fn to_seconds(&self) -> Result<i64> {
        match self {
            DurationInput::Seconds(secs) => Ok(*secs),
            DurationInput::Text(text) => parse_duration_seconds(text),
        }
    }
}

impl Default for DurationInput {
    fn default() -> Self {
        DurationInput::Seconds(0)
    }
}

impl From<i64> for DurationInput {
    fn from(secs: i64) -> Self {
        DurationInput::Seconds(secs)
    }
}

impl From<&str> for DurationInput {
    fn from(text: &str) -> Self {
        DurationInput::Text(text.to_string())
    }
}

impl fmt::Display for DurationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationInput::Seconds(secs) => write!(f, "{}", secs),
            DurationInput::Text(text) => f.write_str(text),
        }
    }
}

/// Parse a duration string into whole seconds.
///
/// Accepts:
/// - an empty string (zero)
/// - a bare integer, interpreted as seconds: `"3600"`, `"-10"`
/// - signed unit segments: `"90s"`, `"60m"`, `"1h30m"`, `"1.5h"`, `"2d"`
///
/// Supported units are `ns`, `us`, `µs`, `ms`, `s`, `m`, `h` and `d`.
pub fn parse_duration_seconds(input: &str) -> Result<i64> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(0);
    }

    if let Ok(secs) = input.parse::<i64>() {
        return Ok(secs);
    }

    let (negative, body) = match input.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, input.strip_prefix('+').unwrap_or(input)),
    };

    if body.is_empty() {
        return Err(invalid_duration(input));
    }

    let mut total_nanos = 0f64;
    let mut rest = body;

    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| invalid_duration(input))?;
        if number_len == 0 {
            return Err(invalid_duration(input));
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number.parse().map_err(|_| invalid_duration(input))?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(tail.len());
        let (unit, remaining) = tail.split_at(unit_len);

        total_nanos += value * unit_nanos(unit).ok_or_else(|| invalid_duration(input))?;
        rest = remaining;
    }

    let secs = (total_nanos / NANOS_PER_SECOND).trunc();
    if !secs.is_finite() || secs > i64::MAX as f64 {
        return Err(CertAuthError::InvalidRequest(format!(
            "duration out of range: {}",
            input
        )));
    }

    #[allow(clippy::cast_possible_truncation)]
    let secs = secs as i64;
    Ok(if negative { -secs } else { secs })
}

fn unit_nanos(unit: &str) -> Option<f64> {
    let nanos = match unit {
        "ns" => 1.0,
        "us" | "µs" | "μs" => 1_000.0,
        "ms" => 1_000_000.0,
        "s" => NANOS_PER_SECOND,
        "m" => 60.0 * NANOS_PER_SECOND,
        "h" => 3_600.0 * NANOS_PER_SECOND,
        "d" => 86_400.0 * NANOS_PER_SECOND,
        _ => return None,
    };
    Some(nanos)
}

fn invalid_duration(input: &str) -> CertAuthError {
    CertAuthError::InvalidRequest(format!("invalid duration: {}", input))
}

/// Serde adapter storing a [`std::time::Duration`] as whole seconds.
pub mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
