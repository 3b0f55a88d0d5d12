//! Typed lookups into a `serde_json::Value` params object.
//!
//! Missing keys and wrong types fall back to the supplied default; these
//! helpers never fail, so a half-valid config still produces a backdrop.

use glam::DVec2;
use serde_json::Value;

/// Extracts an `f64` from `params[name]`. Integers are accepted. Non-finite
/// results fall back to `default`.
pub fn param_f64(params: &Value, name: &str, default: f64) -> f64 {
    params
        .get(name)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

/// Extracts a non-negative integer from `params[name]`.
pub fn param_usize(params: &Value, name: &str, default: usize) -> usize {
    params
        .get(name)
        .and_then(Value::as_u64)
        .and_then(|v| usize::try_from(v).ok())
        .unwrap_or(default)
}

/// Extracts a string from `params[name]`.
pub fn param_string(params: &Value, name: &str, default: &str) -> String {
    params
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(|| default.to_owned())
}

/// Extracts a list of `[x, y]` pairs from `params[name]`.
///
/// The whole list falls back to `default` if any entry is malformed, so a
/// typo cannot silently drop a single point.
pub fn param_points(params: &Value, name: &str, default: &[DVec2]) -> Vec<DVec2> {
    let parsed = params.get(name).and_then(Value::as_array).and_then(|items| {
        items
            .iter()
            .map(|item| match item.as_array().map(Vec::as_slice) {
                Some([x, y]) => Some(DVec2::new(x.as_f64()?, y.as_f64()?)),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
    });
    parsed.unwrap_or_else(|| default.to_vec())
}
