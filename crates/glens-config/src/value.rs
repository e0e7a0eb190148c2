//! Coercion of raw configuration values into typed settings.
//!
//! Values are treated the way an INI reader treats them: everything has a text
//! form, and typed getters parse that text when the value was not written with
//! the native TOML type.

use glens_core::errors::{ErrorInfo, LensError};
use toml::Value;

fn conversion_error(section: &str, key: &str, expected: &str, value: &Value) -> LensError {
    LensError::ValueConversion(
        ErrorInfo::new(
            "value-conversion",
            format!("value cannot be interpreted as {expected}"),
        )
        .with_context("section", section)
        .with_context("key", key)
        .with_context("value", value.to_string()),
    )
}

/// Returns the text form of a scalar value.
pub fn as_text(section: &str, key: &str, value: &Value) -> Result<String, LensError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Integer(int) => Ok(int.to_string()),
        Value::Float(float) => Ok(float.to_string()),
        Value::Boolean(flag) => Ok(flag.to_string()),
        Value::Datetime(stamp) => Ok(stamp.to_string()),
        _ => Err(conversion_error(section, key, "a scalar", value)),
    }
}

/// Coerces a value to `f64`.
pub fn as_float(section: &str, key: &str, value: &Value) -> Result<f64, LensError> {
    match value {
        Value::Float(float) => Ok(*float),
        Value::Integer(int) => Ok(*int as f64),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| conversion_error(section, key, "a float", value)),
        _ => Err(conversion_error(section, key, "a float", value)),
    }
}

/// Coerces a value to `i64`. Floats are accepted only when integral.
pub fn as_int(section: &str, key: &str, value: &Value) -> Result<i64, LensError> {
    match value {
        Value::Integer(int) => Ok(*int),
        Value::Float(float)
            if float.is_finite()
                && float.fract() == 0.0
                && (i64::MIN as f64..i64::MAX as f64).contains(float) =>
        {
            Ok(*float as i64)
        }
        Value::Float(_) => Err(LensError::ValueConversion(
            ErrorInfo::new("not-an-integer", "value is not representable as an integer")
                .with_context("section", section)
                .with_context("key", key)
                .with_context("value", value.to_string()),
        )),
        Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| conversion_error(section, key, "an integer", value)),
        _ => Err(conversion_error(section, key, "an integer", value)),
    }
}

/// Coerces a value to `bool` using the `1/yes/true/on` and `0/no/false/off` spellings.
pub fn as_bool(section: &str, key: &str, value: &Value) -> Result<bool, LensError> {
    match value {
        Value::Boolean(flag) => Ok(*flag),
        Value::Integer(1) => Ok(true),
        Value::Integer(0) => Ok(false),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "1" | "yes" | "true" | "on" => Ok(true),
            "0" | "no" | "false" | "off" => Ok(false),
            _ => Err(conversion_error(section, key, "a boolean", value)),
        },
        _ => Err(conversion_error(section, key, "a boolean", value)),
    }
}

/// Coerces a value to an ordered list of strings.
///
/// Strings are split on commas with whitespace stripped; empty items are dropped.
pub fn as_list(section: &str, key: &str, value: &Value) -> Result<Vec<String>, LensError> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| as_text(section, key, item).map(|text| text.trim().to_string()))
            .filter(|item| !matches!(item, Ok(text) if text.is_empty()))
            .collect(),
        Value::String(text) => Ok(text
            .split(',')
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect()),
        _ => Err(conversion_error(section, key, "a list", value)),
    }
}
