//! Purpose: Downcast dynamic JSON values into caller-named primitive types.
//! Exports: `FromJsonValue`.
//! Role: Element seam shared by the primitive array/set accessors and transforms.
//! Invariants: Downcasts stay within one JSON kind; a mismatch yields absent.

use serde_json::Value;

/// A type that can be extracted from a single dynamic JSON value.
///
/// Implementations cover the JSON primitives plus `Value` itself, which
/// admits arbitrary shapes into the transform pipeline.
pub trait FromJsonValue: Sized {
    fn from_json_value(value: &Value) -> Option<Self>;
}

impl FromJsonValue for String {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromJsonValue for i64 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromJsonValue for u64 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromJsonValue for f64 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromJsonValue for f32 {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|wide| wide as f32)
    }
}

impl FromJsonValue for bool {
    fn from_json_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromJsonValue for Value {
    fn from_json_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::FromJsonValue;
    use serde_json::json;

    #[test]
    fn primitives_extract_in_kind() {
        assert_eq!(String::from_json_value(&json!("ok")), Some("ok".to_string()));
        assert_eq!(i64::from_json_value(&json!(-7)), Some(-7));
        assert_eq!(u64::from_json_value(&json!(7)), Some(7));
        assert_eq!(f64::from_json_value(&json!(0.5)), Some(0.5));
        assert_eq!(bool::from_json_value(&json!(true)), Some(true));
    }

    #[test]
    fn kind_mismatch_is_absent() {
        assert_eq!(String::from_json_value(&json!(1)), None);
        assert_eq!(i64::from_json_value(&json!("1")), None);
        assert_eq!(u64::from_json_value(&json!(-1)), None);
        assert_eq!(bool::from_json_value(&json!("true")), None);
    }

    #[test]
    fn integers_widen_to_floats() {
        assert_eq!(f64::from_json_value(&json!(3)), Some(3.0));
        assert_eq!(f32::from_json_value(&json!(0.25)), Some(0.25f32));
    }
}
