//! Environment snapshot
//!
//! The process environment is read once, merged with the first `.env` file
//! found, and frozen into an [`EnvVars`]. Process variables win over the
//! file; the process environment itself is never modified.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use faros_common::observability::Logger;
use faros_domain::{EnvVars, FarosError, Result};
use tracing::debug;

/// Dotenv files searched in the working directory, in order
pub const ENV_FILE_CANDIDATES: &[&str] = &[".env", ".env.local"];

/// Snapshot the process environment plus the working directory's `.env`.
///
/// Variables whose name or value is not valid Unicode are skipped.
///
/// # Errors
/// Returns `FarosError::Config` if a dotenv file exists but cannot be parsed.
pub fn load_env(logger: &Logger) -> Result<EnvVars> {
    let cwd = std::env::current_dir()
        .map_err(|e| FarosError::Config(format!("Cannot read working directory: {e}")))?;
    let process = logger.in_scope(|| unicode_vars(std::env::vars_os()));
    load_env_from(&cwd, process, logger)
}

/// Build a snapshot from `process` variables and the first dotenv file in `dir`.
///
/// # Errors
/// Returns `FarosError::Config` if the dotenv file is malformed.
pub fn load_env_from<I>(dir: &Path, process: I, logger: &Logger) -> Result<EnvVars>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut env: EnvVars = process.into_iter().collect();

    let Some(path) = find_env_file(dir) else {
        return Ok(env);
    };

    logger.in_scope(|| {
        debug!(path = %path.display(), "Loading dotenv file");
        let entries = dotenvy::from_path_iter(&path)
            .map_err(|e| FarosError::Config(format!("Failed to read {}: {e}", path.display())))?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| {
                FarosError::Config(format!("Invalid entry in {}: {e}", path.display()))
            })?;
            env.insert_if_absent(key, value);
        }
        Ok(env)
    })
}

/// Keep the variables that are valid Unicode, dropping the rest.
pub fn unicode_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (Ok(key), Err(_)) => {
                debug!(key = %key, "Skipping environment variable with non-Unicode value");
                None
            }
            (Err(key), _) => {
                debug!(key = ?key, "Skipping environment variable with non-Unicode name");
                None
            }
        })
        .collect()
}

/// First existing dotenv file in `dir`.
pub fn find_env_file(dir: &Path) -> Option<PathBuf> {
    ENV_FILE_CANDIDATES.iter().map(|name| dir.join(name)).find(|path| path.is_file())
}
