//! Logger construction for the process entry point
//!
//! Builds [`Logger`] handles; nothing here installs a global subscriber.

use std::path::{Path, PathBuf};

use faros_common::observability::{LevelFilter, Logger};
use faros_domain::{FarosError, LogLevel, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Log file written when no path is given
pub const DEFAULT_LOG_FILE: &str = "faros.log";

pub fn level_filter(level: LogLevel) -> LevelFilter {
    match level {
        LogLevel::Debug => LevelFilter::DEBUG,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Warn => LevelFilter::WARN,
        LogLevel::Error => LevelFilter::ERROR,
    }
}

/// Human-readable logger on stderr.
pub fn console_logger(level: LogLevel) -> Logger {
    Logger::stderr(level_filter(level))
}

/// JSON lines appended to `path` (default `./faros.log`).
///
/// Writes go through a background worker; keep the returned guard alive
/// until shutdown so buffered lines are flushed.
///
/// # Errors
/// Returns `FarosError::Io` if the log file cannot be created.
pub fn file_logger(level: LogLevel, path: Option<&Path>) -> Result<(Logger, WorkerGuard)> {
    let path = path.map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), Path::to_path_buf);
    let file_name = path
        .file_name()
        .ok_or_else(|| FarosError::Io(format!("not a log file path: {}", path.display())))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(&dir)
        .map_err(|e| FarosError::Io(format!("cannot open {}: {e}", path.display())))?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::fmt()
        .json()
        .with_max_level(level_filter(level))
        .with_ansi(false)
        .with_writer(writer)
        .finish();

    Ok((Logger::from_subscriber(subscriber), guard))
}
