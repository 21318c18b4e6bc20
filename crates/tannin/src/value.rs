//! Value semantics over [`serde_json::Value`].
//!
//! Template bindings are plain JSON values. This module centralizes the
//! engine's conventions for them: how a value prints into output, when it
//! counts as empty, and how two values compare under the template language's
//! loose, numeric-aware rules.

use std::cmp::Ordering;

use serde_json::Value;

/// The textual form a value takes when emitted into output.
///
/// Null prints as nothing (undefined variables are silent by design),
/// structured values print as their JSON text.
pub fn display(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Emptiness: null, false, zero, the empty string, `"0"`, and empty
/// collections are all empty. This is what `default`, `ifEmpty`, and block
/// override fallbacks test.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().unwrap_or(0.0) == 0.0,
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Truthiness for `{if}` conditions: the complement of emptiness.
pub fn truthy(value: &Value) -> bool {
    !is_empty(value)
}

/// Numeric view of a value: numbers directly, strings when they parse.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Loose equality: numeric when both sides are numeric, boolean against
/// truthiness, null against emptiness, otherwise textual.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), other) | (other, Value::Bool(x)) => *x == truthy(other),
        (Value::Null, other) | (other, Value::Null) => is_empty(other),
        _ => {
            if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
                x == y
            } else {
                display(a) == display(b)
            }
        }
    }
}

/// Loose ordering: numeric when both sides are numeric, otherwise
/// lexicographic over the display forms.
pub fn loose_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        x.partial_cmp(&y)
    } else {
        Some(display(a).cmp(&display(b)))
    }
}
