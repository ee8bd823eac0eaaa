//! # Faros Core
//!
//! Pure sync-engine logic. No HTTP, filesystem or process environment access.
//!
//! This crate contains:
//! - Configuration resolution over already-loaded inputs
//! - Status/time normalization and event builders
//! - Port interfaces (`EventSender`, `ExternalSyncRunner`)
//! - The bounded-concurrency upload coordinator and the Linear sync plan
//!
//! ## Architecture Principles
//! - Depends only on `faros-common` and `faros-domain`
//! - All external effects go through traits implemented in `faros-infra`

pub mod config;
pub mod events;
pub mod sync;

pub use config::{resolve_log_level, resolve_staging_graph, target_graph, ConfigResolver};
pub use events::{
    build_cd_event, build_ci_event, build_test_execution_event, build_upload_tasks,
    normalize_status, normalize_time, CicdOptions, SuitePlanSummary, TestExecutionOptions,
};
pub use sync::{
    run_linear_sync, EventSender, ExternalSyncRunner, LinearSyncOptions, LinearSyncPlan,
    UploadCoordinator,
};
