//! Secret masking for structured values before they are logged

use serde_json::{Map, Value};

/// Replacement written in place of a secret value
pub const MASK: &str = "***";

const SECRET_KEYS: &[&str] = &["apikey", "api_key", "token", "secret", "password", "authorization"];

/// Whether an object key names a secret (case-insensitive).
pub fn is_secret_key(key: &str) -> bool {
    let lowered = key.to_ascii_lowercase();
    SECRET_KEYS.contains(&lowered.as_str())
}

/// Return a copy of `value` with every secret-named key masked, at any depth.
pub fn redact_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let redacted: Map<String, Value> = map
                .iter()
                .map(|(key, inner)| {
                    let masked = if is_secret_key(key) && !inner.is_null() {
                        Value::String(MASK.to_string())
                    } else {
                        redact_json(inner)
                    };
                    (key.clone(), masked)
                })
                .collect();
            Value::Object(redacted)
        }
        Value::Array(items) => Value::Array(items.iter().map(redact_json).collect()),
        other => other.clone(),
    }
}
