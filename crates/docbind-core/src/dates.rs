//! Calendar-day parsing for date-like dataset values.
//!
//! Accepted inputs:
//! - `YYYY-MM-DD` and `YYYY/MM/DD`
//! - ISO datetimes with `T` or space separator, optional seconds,
//!   fractional seconds and offset
//! - RFC 2822 / HTTP dates (`Mon, 01 Jan 2024 00:00:00 GMT`)
//! - numbers, read as milliseconds since the Unix epoch (UTC)
//!
//! Offset-bearing values keep the calendar day they were written in.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Group key used for x values that are not dates.
pub const INVALID_DATE_KEY: &str = "Invalid Date";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

/// Parses a string into its calendar day.
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.date_naive());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    None
}

/// Parses a raw dataset value into its calendar day.
pub fn parse_calendar_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_date_str(s),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
        }
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// The canonical `YYYY-MM-DD` key for a date-like value.
pub fn canonical_date_key(value: &Value) -> Option<String> {
    parse_calendar_date(value).map(|d| d.format("%Y-%m-%d").to_string())
}
