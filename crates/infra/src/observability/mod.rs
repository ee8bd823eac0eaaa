//! Logger construction

pub mod logging;

pub use logging::{console_logger, file_logger, level_filter, DEFAULT_LOG_FILE};
