//! Fixed point timestamps.
//!
//! A run may stamp every line with the same instant. The instant is given on
//! the command line in one of several human formats and written to the line
//! in the precision the write endpoint expects.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Unix seconds, optionally with a fractional part.
static EPOCH_SECONDS_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)(?:\.(\d{1,9}))?$").unwrap());

/// Naive date-time layouts, read as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Timestamp precision of the written lines.
///
/// Codes match the `precision` query parameter of the InfluxDB `/write`
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Precision {
    #[default]
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
}

impl Precision {
    /// Query-parameter code for this precision.
    pub fn as_str(&self) -> &'static str {
        match self {
            Precision::Nanoseconds => "n",
            Precision::Microseconds => "u",
            Precision::Milliseconds => "ms",
            Precision::Seconds => "s",
            Precision::Minutes => "m",
            Precision::Hours => "h",
        }
    }

    /// Number of nanoseconds in one unit.
    pub fn nanos_per_unit(&self) -> i64 {
        match self {
            Precision::Nanoseconds => 1,
            Precision::Microseconds => 1_000,
            Precision::Milliseconds => 1_000_000,
            Precision::Seconds => NANOS_PER_SECOND,
            Precision::Minutes => 60 * NANOS_PER_SECOND,
            Precision::Hours => 3_600 * NANOS_PER_SECOND,
        }
    }

    /// Convert epoch nanoseconds into this precision, rounding towards the
    /// earlier instant.
    pub fn from_nanos(&self, nanos: i64) -> i64 {
        nanos.div_euclid(self.nanos_per_unit())
    }
}

impl std::fmt::Display for Precision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "n" | "ns" => Ok(Precision::Nanoseconds),
            "u" | "us" | "µs" => Ok(Precision::Microseconds),
            "ms" => Ok(Precision::Milliseconds),
            "s" => Ok(Precision::Seconds),
            "m" => Ok(Precision::Minutes),
            "h" => Ok(Precision::Hours),
            _ => Err(format!(
                "Unknown precision '{}'. Use 'n', 'u', 'ms', 's', 'm' or 'h'.",
                s
            )),
        }
    }
}

/// Parse a user supplied timestamp into Unix epoch nanoseconds.
///
/// Accepted forms:
/// - RFC 3339: `2016-09-26T02:00:00+00:00`
/// - naive date-time, read as UTC: `2016-09-26T02:00:00`, `2016-09-26 02:00:00.5`
/// - date, midnight UTC: `2016-09-26`
/// - Unix seconds: `1474855200`, `1474855200.25`
pub fn parse_timestamp(input: &str) -> Result<i64> {
    let s = input.trim();
    let invalid = || Error::InvalidTimestamp(input.to_string());

    if let Some(caps) = EPOCH_SECONDS_REGEX.captures(s) {
        return epoch_seconds_to_nanos(&caps[1], caps.get(2).map(|m| m.as_str()))
            .ok_or_else(invalid);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.timestamp_nanos_opt().ok_or_else(invalid);
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Utc
                .from_utc_datetime(&naive)
                .timestamp_nanos_opt()
                .ok_or_else(invalid);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(invalid)?;
        return Utc
            .from_utc_datetime(&midnight)
            .timestamp_nanos_opt()
            .ok_or_else(invalid);
    }

    Err(invalid())
}

/// Combine whole seconds and an optional fraction of up to nine digits.
fn epoch_seconds_to_nanos(seconds: &str, fraction: Option<&str>) -> Option<i64> {
    let secs: i64 = seconds.parse().ok()?;
    let frac_nanos: i64 = match fraction {
        Some(digits) => format!("{:0<9}", digits).parse().ok()?,
        None => 0,
    };
    let frac_nanos = if seconds.starts_with('-') {
        -frac_nanos
    } else {
        frac_nanos
    };
    secs.checked_mul(NANOS_PER_SECOND)?.checked_add(frac_nanos)
}
