//! Observability primitives
//!
//! Logging goes through an explicitly constructed [`Logger`] handle rather
//! than a process-wide default subscriber.

pub mod logging;

pub use logging::Logger;
pub use tracing::level_filters::LevelFilter;
