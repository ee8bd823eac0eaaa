//! Generic building blocks shared across the Faros sync crates.
//!
//! - `resilience`: retry with exponential backoff and a bulkhead limiter
//! - `observability`: the explicit [`Logger`] handle
//! - `privacy`: secret masking for structured log payloads

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod observability;
pub mod privacy;
pub mod resilience;

pub use observability::Logger;
pub use privacy::redact_json;
pub use resilience::{
    Bulkhead, BulkheadPermit, ResilienceError, RetryConfig, RetryError, RetryExecutor,
};
