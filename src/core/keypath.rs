//! Purpose: Resolve dotted keypaths against nested JSON objects.
//! Exports: `JsonObject`, `resolve`.
//! Role: Pure navigation primitive underneath every typed accessor.
//! Invariants: `Null` resolves to absent at any depth.
//! Invariants: Remaining segments against a non-object resolve to absent, never an error.

use serde_json::{Map, Value};

/// A decoded JSON object: string keys mapped to dynamic values.
pub type JsonObject = Map<String, Value>;

/// Walk `keypath` (dot-separated object keys) through `object`.
///
/// Segments are matched case-sensitively and literal dots cannot be escaped.
/// A missing key, a `null` value, or a non-object met before the last segment
/// all yield `None`.
pub fn resolve<'a>(keypath: &str, object: &'a JsonObject) -> Option<&'a Value> {
    let (head, tail) = match keypath.split_once('.') {
        Some((head, tail)) => (head, Some(tail)),
        None => (keypath, None),
    };

    let value = object.get(head)?;
    if value.is_null() {
        return None;
    }

    match tail {
        None => Some(value),
        Some(tail) => match value {
            Value::Object(nested) => resolve(tail, nested),
            _ => None,
        },
    }
}
