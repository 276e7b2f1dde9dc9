//! Coercion of loosely-typed Gamma/CLOB fields.
//!
//! The upstream APIs encode the same list field in several ways: a JSON array,
//! a string holding a JSON array, a comma-separated string, a bare scalar or
//! null. Everything funnels through [`to_string_list`] so callers never inspect
//! the raw shape themselves.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Normalize a JSON value into an ordered list of strings.
///
/// Rules, first match wins:
/// 1. `null` gives an empty list.
/// 2. An array gives each element stringified, in order.
/// 3. A string that looks like a JSON array or object once trimmed is parsed;
///    if the result is an array its elements are stringified. Otherwise falls
///    through to rule 4.
/// 4. A string is split on commas, parts trimmed, empty parts dropped.
/// 5. Any other scalar gives a single-element list.
pub fn to_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(stringify).collect(),
        Value::String(s) => {
            if looks_like_json_container(s.trim()) {
                if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(s.trim()) {
                    return items.iter().map(stringify).collect();
                }
            }
            split_commas(s)
        }
        other => vec![stringify(other)],
    }
}

/// Render one JSON value as a plain string.
///
/// Strings are taken verbatim; everything else uses its compact JSON form.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn looks_like_json_container(s: &str) -> bool {
    (s.starts_with('[') && s.ends_with(']')) || (s.starts_with('{') && s.ends_with('}'))
}

fn split_commas(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a number or numeric string into a decimal.
///
/// Accepts plain and scientific notation. Anything else, including booleans
/// and empty strings, gives `None`.
pub fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_decimal_str(&n.to_string()),
        Value::String(s) => parse_decimal_str(s.trim()),
        _ => None,
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
}

/// JSON truthiness: null, false, zero, empty strings and empty containers are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Borrow a string field when it is a non-empty string.
pub fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}
