//! Port interfaces for sync operations

use async_trait::async_trait;
use faros_domain::{Event, Result, SendOptions};

use super::linear::LinearSyncPlan;

/// Delivers a single event to a graph.
///
/// Implementations own their retry policy; an error returned here is final.
#[async_trait]
pub trait EventSender: Send + Sync {
    async fn send_event(&self, graph: &str, event: &Event, options: SendOptions) -> Result<()>;
}

/// Runs an external containerized connector to completion.
///
/// Spawning, image pulls and temp files belong to the implementation.
#[async_trait]
pub trait ExternalSyncRunner: Send + Sync {
    /// Returns the runner's exit code.
    async fn run_external_sync(&self, plan: &LinearSyncPlan) -> Result<i32>;
}
