//! Helpers for reading typed engine parameters from a `serde_json::Value`.
//!
//! Each helper takes a JSON value, a key name, and a default. If the key is
//! missing or the value has the wrong type, the default is returned, so a
//! partial `--params` object only overrides what it names.

use serde_json::Value;

/// Extracts an `f64` from `params[name]`, returning `default` if missing or wrong type.
///
/// Integers are accepted and converted.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params.get(name).and_then(Value::as_f64).unwrap_or(default)
}

/// Extracts a `usize` from `params[name]`, returning `default` if missing or wrong type.
///
/// Only non-negative integers are accepted.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a `bool` from `params[name]`, returning `default` if missing or wrong type.
pub fn param_bool(params: &Value, name: &str, default: bool) -> bool {
    params.get(name).and_then(Value::as_bool).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn param_f64_extracts_existing_float() {
        let params = json!({"zoom_speed": 2.5});
        assert_eq!(param_f64(&params, "zoom_speed", 1.0), 2.5);
    }

    #[test]
    fn param_f64_extracts_integer_as_float() {
        let params = json!({"initial_frequency": 4});
        assert_eq!(param_f64(&params, "initial_frequency", 0.0), 4.0);
    }

    #[test]
    fn param_f64_returns_default_when_key_missing_or_wrong_type() {
        assert_eq!(param_f64(&json!({}), "pan_speed", 3.0), 3.0);
        assert_eq!(param_f64(&json!({"pan_speed": "fast"}), "pan_speed", 1.0), 1.0);
        assert_eq!(param_f64(&json!({"pan_speed": null}), "pan_speed", 5.0), 5.0);
        assert_eq!(param_f64(&json!("not an object"), "pan_speed", 7.0), 7.0);
    }

    #[test]
    fn param_usize_extracts_existing_integer() {
        assert_eq!(param_usize(&json!({"octaves": 6}), "octaves", 4), 6);
    }

    #[test]
    fn param_usize_rejects_float_negative_and_string() {
        assert_eq!(param_usize(&json!({"octaves": 2.5}), "octaves", 4), 4);
        assert_eq!(param_usize(&json!({"octaves": -1}), "octaves", 4), 4);
        assert_eq!(param_usize(&json!({"octaves": "many"}), "octaves", 4), 4);
    }

    #[test]
    fn param_bool_extracts_and_defaults() {
        assert!(!param_bool(&json!({"island_mask": false}), "island_mask", true));
        assert!(param_bool(&json!({}), "island_mask", true));
        assert!(!param_bool(&json!({"island_mask": 1}), "island_mask", false));
    }
}
