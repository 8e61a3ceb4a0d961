//! Helpers for loosely-typed submitted field values.

use serde_json::Value;

/// Whether a submitted value counts as "not filled".
///
/// Null, whitespace-only strings, empty arrays and empty objects are blank.
/// `false` and `0` are real answers and are not.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Whether a field is absent or blank in a record.
pub fn is_missing(data: &serde_json::Map<String, Value>, field: &str) -> bool {
    data.get(field).is_none_or(is_blank)
}

/// Render a scalar value for display; `None` for blank or structured values.
pub fn display_string(value: &Value) -> Option<String> {
    if is_blank(value) {
        return None;
    }
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// File name carried by a file value: a plain string, or an object's `name`.
pub fn file_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.as_str()),
        Value::Object(map) => map
            .get("name")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty()),
        _ => None,
    }
}

/// Declared byte size of a file value.
///
/// `None` when no size is given, `Some(None)` when the size is not a
/// non-negative number. Integer and float encodings are both accepted.
pub fn file_size(value: &Value) -> Option<Option<f64>> {
    match value.get("size") {
        None | Some(Value::Null) => None,
        Some(size) => Some(size.as_f64().filter(|s| s.is_finite() && *s >= 0.0)),
    }
}
