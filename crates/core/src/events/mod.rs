//! Event normalization and construction
//!
//! Everything here is synchronous and free of I/O. Builders validate the
//! minimum-field invariants before an event can be handed to a sender.

pub mod cicd;
pub mod normalize;
pub mod test_execution;

pub use cicd::{build_cd_event, build_ci_event, CdEventBuilder, CiEventBuilder, CicdOptions};
pub use normalize::{normalize_status, normalize_time, normalize_time_at};
pub use test_execution::{
    build_test_execution_event, build_upload_tasks, SuitePlanSummary, TestExecutionEventBuilder,
    TestExecutionOptions,
};
