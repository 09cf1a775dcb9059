//! Permissive readers over `serde_json::Value`
//!
//! Each reader takes a list of candidate keys (snake_case first, then
//! camelCase and Portuguese aliases) and returns the first usable value.

use chrono::NaiveDate;
use serde_json::Value;

/// First key holding a non-null value
pub(crate) fn get<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Whether any of the keys is present with a non-null value
pub(crate) fn has_any(obj: &Value, keys: &[&str]) -> bool {
    get(obj, keys).is_some()
}

/// First key holding a JSON object
pub(crate) fn object<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| value.is_object())
}

/// First key holding an array, or an empty slice
pub(crate) fn list<'a>(obj: &'a Value, keys: &[&str]) -> &'a [Value] {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(|value| value.as_array())
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Trimmed, non-empty text. Numbers and booleans are stringified.
pub(crate) fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

pub(crate) fn text(obj: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(value_text)
}

/// Finite number from a JSON number or a numeric string (comma decimals accepted)
pub(crate) fn value_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

pub(crate) fn number(obj: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(value_number)
}

/// Boolean from JSON booleans or yes/no text
pub(crate) fn flag(obj: &Value, keys: &[&str]) -> Option<bool> {
    keys.iter().filter_map(|key| obj.get(*key)).find_map(|value| match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "sim" | "yes" | "1" => Some(true),
            "false" | "nao" | "não" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Calendar date from `YYYY-MM-DD` (optionally followed by a time) or `DD/MM/YYYY`
pub(crate) fn date(obj: &Value, keys: &[&str]) -> Option<NaiveDate> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .filter_map(value_text)
        .find_map(|s| parse_date(&s))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    s.get(..10)
        .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        .or_else(|| NaiveDate::parse_from_str(s, "%d/%m/%Y").ok())
}

/// List of strings from an array (strings or `{text}` objects) or newline-separated text
pub(crate) fn text_list(obj: &Value, keys: &[&str]) -> Vec<String> {
    match get(obj, keys) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| value_text(item).or_else(|| text(item, &["text", "texto", "descricao"])))
            .collect(),
        Some(Value::String(s)) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Round to two decimal places
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
