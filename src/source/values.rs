use crate::model::{first_year_in, YearLabel};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Non-empty, trimmed text from a JSON scalar.
pub fn text(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    if raw.is_empty() {
        None
    } else {
        Some(raw)
    }
}

/// Lenient count parsing. Sources report counts as numbers, as strings with
/// thousands separators, or with magnitude suffixes ("1.2M", "500K", "3 billion").
/// Anything unparsable or negative counts as zero.
pub fn parse_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(count) => count,
            None => n.as_f64().map(float_to_count).unwrap_or(0),
        },
        Some(Value::String(s)) => parse_count_text(s),
        _ => 0,
    }
}

pub fn parse_count_text(text: &str) -> u64 {
    parse_scaled(text).map(float_to_count).unwrap_or(0)
}

/// Lenient float parsing for monetary amounts.
pub fn parse_amount(value: Option<&Value>) -> Option<f64> {
    let amount = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_scaled(s),
        _ => None,
    };
    amount.filter(|amount| amount.is_finite())
}

fn parse_scaled(text: &str) -> Option<f64> {
    let cleaned = text.replace(',', "").trim().to_lowercase();
    if cleaned.is_empty() {
        return None;
    }

    const SUFFIXES: &[(&str, f64)] = &[
        ("billion", 1e9),
        ("million", 1e6),
        ("thousand", 1e3),
        ("b", 1e9),
        ("m", 1e6),
        ("k", 1e3),
    ];

    for (suffix, scale) in SUFFIXES {
        if let Some(number) = cleaned.strip_suffix(suffix) {
            if let Ok(parsed) = number.trim().parse::<f64>() {
                return Some(parsed * scale);
            }
        }
    }
    cleaned.parse::<f64>().ok()
}

fn float_to_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

/// Year label from a `Year`-style field, which may be numeric or free text.
pub fn year_label(value: Option<&Value>) -> Option<YearLabel> {
    match value? {
        Value::Number(n) => n.as_i64().map(|year| YearLabel::new(year.to_string())),
        Value::String(s) if !s.trim().is_empty() => Some(YearLabel::new(s.as_str())),
        _ => None,
    }
}

/// Calendar year of a date-valued field.
pub fn year_from_date(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.year());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(datetime.year());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(datetime.year());
    }
    first_year_in(trimmed)
}
