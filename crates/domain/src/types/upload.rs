//! Upload batch units and their aggregate outcome

use serde::{Deserialize, Serialize};

use super::event::Event;

/// Query flags of a single event submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOptions {
    pub validate_only: bool,
    pub full: bool,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self { validate_only: false, full: true }
    }
}

impl SendOptions {
    /// Ask the server to validate without writing.
    pub fn validate_only() -> Self {
        Self { validate_only: true, ..Self::default() }
    }
}

/// One independent unit of upload work
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTask {
    /// Human-meaningful identity reported back on failure (e.g. suite name)
    pub identity: String,
    pub event: Event,
}

impl UploadTask {
    pub fn new(identity: impl Into<String>, event: Event) -> Self {
        Self { identity: identity.into(), event }
    }
}

/// Lifecycle of a task inside a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Pending,
    Sending,
    Succeeded,
    Failed,
}

impl TaskState {
    pub fn is_settled(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// A task that did not upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadFailure {
    pub identity: String,
    pub error_message: String,
}

/// Batch-level outcome
///
/// `uploaded_count + errors.len()` equals the number of submitted tasks.
/// `errors` is in completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub uploaded_count: usize,
    pub errors: Vec<UploadFailure>,
}

impl UploadResult {
    pub fn total(&self) -> usize {
        self.uploaded_count + self.errors.len()
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Render at most `limit` failures, followed by a "... and N more" line
    /// when the list was truncated.
    pub fn failure_listing(&self, limit: usize) -> Vec<String> {
        let mut lines: Vec<String> = self
            .errors
            .iter()
            .take(limit)
            .map(|e| format!("{}: {}", e.identity, e.error_message))
            .collect();
        if self.errors.len() > limit {
            lines.push(format!("... and {} more", self.errors.len() - limit));
        }
        lines
    }
}

/// Incremental progress of a running batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadProgress {
    pub total: usize,
    pub settled: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub in_flight: usize,
}

impl UploadProgress {
    pub fn new(total: usize) -> Self {
        Self { total, ..Self::default() }
    }

    pub fn is_complete(&self) -> bool {
        self.settled >= self.total
    }
}
