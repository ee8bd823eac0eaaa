//! Resilience patterns for fault tolerance
//!
//! - **Retry**: bounded attempts with exponential backoff and jitter
//! - **Bulkhead**: a concurrency ceiling shared by spawned tasks
//!
//! Both are generic; callers decide which errors are transient through a
//! [`RetryPolicy`].

pub mod bulkhead;
pub mod retry;

pub use bulkhead::{Bulkhead, BulkheadMetrics, BulkheadPermit};
pub use retry::{
    policies, BackoffStrategy, Jitter, RetryConfig, RetryConfigBuilder, RetryDecision, RetryError,
    RetryExecutor, RetryPolicy, RetryResult,
};
use thiserror::Error;

/// Errors raised by the resilience primitives themselves
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResilienceError {
    #[error("invalid resilience configuration: {0}")]
    InvalidConfig(String),

    #[error("bulkhead is closed")]
    BulkheadClosed,
}
