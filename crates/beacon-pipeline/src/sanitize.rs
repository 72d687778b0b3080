//! Sensitive-key scrubbing for custom event properties.

use serde_json::Value;

/// A property is dropped when its lowercased key contains any of these.
pub const SENSITIVE_KEY_FRAGMENTS: &[&str] = &[
    "password",
    "passwd",
    "token",
    "secret",
    "auth",
    "credential",
    "apikey",
    "api_key",
    "cookie",
    "session",
];

/// Returns a copy of `value` with sensitive-looking keys removed.
///
/// Only top-level keys of objects are inspected; non-object input passes
/// through unchanged. Pure function over a copy.
pub fn sanitize(value: &Value) -> Value {
    let Value::Object(map) = value else {
        return value.clone();
    };
    let filtered = map
        .iter()
        .filter(|(key, _)| !is_sensitive_key(key))
        .map(|(key, val)| (key.clone(), val.clone()))
        .collect();
    Value::Object(filtered)
}

fn is_sensitive_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    SENSITIVE_KEY_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}
