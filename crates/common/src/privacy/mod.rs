//! Data sanitization helpers

pub mod redact;

pub use redact::{is_secret_key, redact_json, MASK};
