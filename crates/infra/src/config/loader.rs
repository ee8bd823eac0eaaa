//! Configuration file loader
//!
//! Finds and parses the optional configuration file. The parsed
//! [`FileConfig`] is schema-validated here; merging with the environment and
//! CLI happens in `faros_core::ConfigResolver`.
//!
//! ## File Locations
//! The loader searches for the following names in the working directory, in order:
//! 1. `faros.config.yaml`, `faros.config.yml`, `faros.config.json`,
//!    `faros.config.toml`
//! 2. `.farosrc.yaml`, `.farosrc.yml`, `.farosrc.json`, `.farosrc.toml`
//!
//! ## Formats
//! Chosen by extension: YAML, JSON or TOML. A bare `.farosrc` is read as
//! YAML. An empty file yields an empty configuration.

use std::path::{Path, PathBuf};

use faros_common::observability::Logger;
use faros_domain::{FarosError, FileConfig, Result};
use tracing::{debug, info};

/// File names searched by [`find_config_path`], in priority order
pub const CONFIG_SEARCH_PLACES: &[&str] = &[
    "faros.config.yaml",
    "faros.config.yml",
    "faros.config.json",
    "faros.config.toml",
    ".farosrc.yaml",
    ".farosrc.yml",
    ".farosrc.json",
    ".farosrc.toml",
];

/// Load the configuration file for this invocation.
///
/// With an explicit `path` the file must exist. Without one, the current
/// working directory is searched and `Ok(None)` means nothing was found.
///
/// # Errors
/// Returns `FarosError::Config` if an explicit file is missing, a file cannot
/// be read or parsed, or the parsed file fails validation.
pub fn load(path: Option<PathBuf>, logger: &Logger) -> Result<Option<FileConfig>> {
    match path {
        Some(path) => load_from_file(&path, logger).map(Some),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| FarosError::Config(format!("Cannot read working directory: {e}")))?;
            discover(&cwd, logger)
        }
    }
}

/// Search `dir` for a configuration file and load the first one found.
///
/// # Errors
/// Returns `FarosError::Config` if the file found is invalid.
pub fn discover(dir: &Path, logger: &Logger) -> Result<Option<FileConfig>> {
    match find_config_path(dir) {
        Some(path) => load_from_file(&path, logger).map(Some),
        None => {
            logger.in_scope(|| debug!(dir = %dir.display(), "No configuration file found"));
            Ok(None)
        }
    }
}

/// Load and validate a configuration file.
///
/// # Errors
/// Returns `FarosError::Config` if the file is missing, unreadable, malformed
/// or fails validation.
pub fn load_from_file(path: &Path, logger: &Logger) -> Result<FileConfig> {
    if !path.exists() {
        return Err(FarosError::Config(format!("Config file not found: {}", path.display())));
    }

    logger.in_scope(|| info!(path = %path.display(), "Loading configuration from file"));

    let contents = std::fs::read_to_string(path)
        .map_err(|e| FarosError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, path)?;
    config.validate().map_err(|e| match e {
        FarosError::Config(msg) => {
            FarosError::Config(format!("Invalid configuration in {}: {msg}", path.display()))
        }
        other => other,
    })?;
    Ok(config)
}

/// Parse configuration content; format is detected by file extension.
///
/// # Errors
/// Returns `FarosError::Config` if the format is unsupported or parsing fails.
pub fn parse_config(contents: &str, path: &Path) -> Result<FileConfig> {
    if contents.trim().is_empty() {
        return Ok(FileConfig::default());
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("yaml");

    match extension {
        "yaml" | "yml" => serde_yaml::from_str(contents)
            .map_err(|e| FarosError::Config(format!("Invalid YAML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| FarosError::Config(format!("Invalid JSON format: {e}"))),
        "toml" => toml::from_str(contents)
            .map_err(|e| FarosError::Config(format!("Invalid TOML format: {e}"))),
        _ => Err(FarosError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// First existing configuration file in `dir`.
///
/// A bare `.farosrc` is considered after every named candidate.
pub fn find_config_path(dir: &Path) -> Option<PathBuf> {
    CONFIG_SEARCH_PLACES
        .iter()
        .map(|name| dir.join(name))
        .chain(std::iter::once(dir.join(".farosrc")))
        .find(|path| path.is_file())
}
