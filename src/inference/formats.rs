//! Value pattern detection for sampled cells

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Format tag attached to an inferred column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    Uuid,
    Email,
    Url,
    Date,
    Time,
    DateTime,
    DateTimeTz,
    Json,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Uuid => write!(f, "uuid"),
            Format::Email => write!(f, "email"),
            Format::Url => write!(f, "url"),
            Format::Date => write!(f, "date"),
            Format::Time => write!(f, "time"),
            Format::DateTime => write!(f, "date-time"),
            Format::DateTimeTz => write!(f, "date-time-tz"),
            Format::Json => write!(f, "json"),
        }
    }
}

static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static URL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|ftp)://[^\s/$.?#][^\s]*$").unwrap());

static INTEGER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

static DECIMAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+)?(?:\.(\d*))?$").unwrap());

static EXPONENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)[eE][+-]?\d+$").unwrap());

const BOOLEAN_TOKENS: &[&str] = &["true", "false", "t", "f", "yes", "no", "y", "n"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATETIME_TZ_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
];

pub fn is_uuid(value: &str) -> bool {
    UUID_REGEX.is_match(value)
}

pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

pub fn is_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

pub fn is_boolean_token(value: &str) -> bool {
    let lower = value.to_lowercase();
    BOOLEAN_TOKENS.contains(&lower.as_str())
}

/// `007` and `-01` are codes, not numbers.
fn has_padded_integer_part(digits: &str) -> bool {
    digits.len() > 1 && digits.starts_with('0')
}

/// Parsed whole number. `Wide` holds magnitudes beyond 64 bits as a digit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegerValue {
    Fits(i64),
    Wide { digits: u32 },
}

pub fn parse_integer(value: &str) -> Option<IntegerValue> {
    if !INTEGER_REGEX.is_match(value) {
        return None;
    }
    let digits = value.trim_start_matches(['+', '-']);
    if has_padded_integer_part(digits) {
        return None;
    }
    Some(match value.parse::<i64>() {
        Ok(n) => IntegerValue::Fits(n),
        Err(_) => IntegerValue::Wide {
            digits: digits.len() as u32,
        },
    })
}

/// Digits before and after the decimal point of a plain decimal literal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalShape {
    pub integer_digits: u32,
    pub scale: u32,
}

pub fn decimal_shape(value: &str) -> Option<DecimalShape> {
    let caps = DECIMAL_REGEX.captures(value)?;
    let integer = caps.get(1).map(|m| m.as_str()).unwrap_or("");
    let fraction = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    if integer.is_empty() && fraction.is_empty() {
        return None;
    }
    if has_padded_integer_part(integer) {
        return None;
    }
    let significant = integer.trim_start_matches('0');
    Some(DecimalShape {
        integer_digits: significant.len() as u32,
        scale: fraction.len() as u32,
    })
}

pub fn is_exponent_number(value: &str) -> bool {
    EXPONENT_REGEX.is_match(value) && value.parse::<f64>().is_ok()
}

/// Temporal classification of a single value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
    TimestampTz,
}

pub fn temporal_kind(value: &str) -> Option<TemporalKind> {
    if DATE_FORMATS
        .iter()
        .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
    {
        return Some(TemporalKind::Date);
    }
    if TIME_FORMATS
        .iter()
        .any(|f| NaiveTime::parse_from_str(value, f).is_ok())
    {
        return Some(TemporalKind::Time);
    }
    if DateTime::parse_from_rfc3339(value).is_ok()
        || DATETIME_TZ_FORMATS
            .iter()
            .any(|f| DateTime::parse_from_str(value, f).is_ok())
    {
        return Some(TemporalKind::TimestampTz);
    }
    if DATETIME_FORMATS
        .iter()
        .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
    {
        return Some(TemporalKind::Timestamp);
    }
    None
}

/// Combine per-value temporal kinds into one column kind.
///
/// Dates widen to timestamps; any offset makes the column zoned. Times only
/// combine with times.
pub fn merge_temporal(kinds: &[TemporalKind]) -> Option<TemporalKind> {
    let has_time = kinds.contains(&TemporalKind::Time);
    if has_time {
        return kinds
            .iter()
            .all(|k| *k == TemporalKind::Time)
            .then_some(TemporalKind::Time);
    }
    kinds.iter().copied().max()
}

/// JSON objects and arrays; bare scalars do not count.
pub fn is_json_document(value: &str) -> bool {
    let trimmed = value.trim_start();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return false;
    }
    matches!(
        serde_json::from_str::<serde_json::Value>(value),
        Ok(serde_json::Value::Object(_)) | Ok(serde_json::Value::Array(_))
    )
}

/// Best single-value format tag, in detection priority order.
pub fn detect_format(value: &str) -> Option<Format> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if is_uuid(value) {
        return Some(Format::Uuid);
    }
    if is_email(value) {
        return Some(Format::Email);
    }
    if is_url(value) {
        return Some(Format::Url);
    }
    if let Some(kind) = temporal_kind(value) {
        return Some(match kind {
            TemporalKind::Date => Format::Date,
            TemporalKind::Time => Format::Time,
            TemporalKind::Timestamp => Format::DateTime,
            TemporalKind::TimestampTz => Format::DateTimeTz,
        });
    }
    if is_json_document(value) {
        return Some(Format::Json);
    }
    None
}
