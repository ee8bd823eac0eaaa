//! Bulkhead pattern for limiting concurrent operations
//!
//! A bulkhead caps how many operations may run at once. Callers wait for a
//! permit; permits are owned so they can move into spawned tasks and are
//! released when dropped, whether the task succeeded, failed or panicked.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use super::ResilienceError;

/// Bulkhead for limiting concurrent operations
///
/// ```rust
/// use faros_common::resilience::Bulkhead;
///
/// # async fn example() -> Result<(), faros_common::resilience::ResilienceError> {
/// let bulkhead = Bulkhead::new(4)?;
/// let permit = bulkhead.acquire().await?;
/// tokio::spawn(async move {
///     let _permit = permit;
///     // bounded work
/// });
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Bulkhead {
    max_concurrent: usize,
    semaphore: Arc<Semaphore>,
    counters: Arc<Counters>,
}

#[derive(Debug, Default)]
struct Counters {
    current: AtomicUsize,
    peak: AtomicUsize,
    total: AtomicUsize,
}

/// Permit held for the duration of one bounded operation
pub struct BulkheadPermit {
    _permit: OwnedSemaphorePermit,
    counters: Arc<Counters>,
}

impl Drop for BulkheadPermit {
    fn drop(&mut self) {
        self.counters.current.fetch_sub(1, Ordering::AcqRel);
    }
}

impl fmt::Debug for BulkheadPermit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BulkheadPermit").finish_non_exhaustive()
    }
}

/// Snapshot of bulkhead counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkheadMetrics {
    pub max_concurrent: usize,
    pub current_concurrent: usize,
    pub peak_concurrent: usize,
    pub total_operations: usize,
}

impl BulkheadMetrics {
    pub fn is_at_capacity(&self) -> bool {
        self.current_concurrent >= self.max_concurrent
    }
}

impl Bulkhead {
    /// Create a bulkhead admitting at most `max_concurrent` operations.
    pub fn new(max_concurrent: usize) -> Result<Self, ResilienceError> {
        if max_concurrent == 0 {
            return Err(ResilienceError::InvalidConfig(
                "max_concurrent must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            max_concurrent,
            semaphore: Arc::new(Semaphore::new(max_concurrent)),
            counters: Arc::new(Counters::default()),
        })
    }

    /// Wait for a free slot.
    pub async fn acquire(&self) -> Result<BulkheadPermit, ResilienceError> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| ResilienceError::BulkheadClosed)?;
        Ok(self.track(permit))
    }

    /// Take a slot only if one is free right now.
    pub fn try_acquire(&self) -> Option<BulkheadPermit> {
        Arc::clone(&self.semaphore).try_acquire_owned().ok().map(|permit| self.track(permit))
    }

    /// Stop admitting work; pending `acquire` calls fail.
    pub fn close(&self) {
        self.semaphore.close();
    }

    fn track(&self, permit: OwnedSemaphorePermit) -> BulkheadPermit {
        let current = self.counters.current.fetch_add(1, Ordering::AcqRel) + 1;
        self.counters.peak.fetch_max(current, Ordering::AcqRel);
        self.counters.total.fetch_add(1, Ordering::Relaxed);
        debug!(current, max = self.max_concurrent, "bulkhead permit acquired");
        BulkheadPermit { _permit: permit, counters: Arc::clone(&self.counters) }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn current_concurrent(&self) -> usize {
        self.counters.current.load(Ordering::Acquire)
    }

    pub fn metrics(&self) -> BulkheadMetrics {
        BulkheadMetrics {
            max_concurrent: self.max_concurrent,
            current_concurrent: self.current_concurrent(),
            peak_concurrent: self.counters.peak.load(Ordering::Acquire),
            total_operations: self.counters.total.load(Ordering::Acquire),
        }
    }
}

impl fmt::Debug for Bulkhead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bulkhead")
            .field("max_concurrent", &self.max_concurrent)
            .field("current_concurrent", &self.current_concurrent())
            .finish()
    }
}
