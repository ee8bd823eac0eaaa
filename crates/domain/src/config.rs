//! Configuration structures
//!
//! Three shapes live here:
//! - [`FileConfig`]: what a configuration file deserializes into. It tolerates
//!   secret-shaped fields so they can be detected and stripped.
//! - [`CliOverrides`] and [`EnvVars`]: the other two resolution inputs.
//! - [`Config`]: the resolved, immutable configuration. It never carries a
//!   secret that did not come from the environment or the CLI.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CONCURRENCY;
use crate::errors::{FarosError, Result};
use crate::impl_domain_enum_conversions;
use crate::types::TestType;

/// A credential value. `Debug` never prints the contents.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the raw credential. Call only at the point of use.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Log verbosity accepted in `logs.level`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl_domain_enum_conversions!(LogLevel {
    Debug => "debug",
    Info => "info",
    Warn => "warn",
    Error => "error",
});

/// Non-secret settings for one integration source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_interval: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streams: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cutoff_days: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_name: Option<String>,
}

impl SourceConfig {
    /// Minimal entry synthesized when only a credential is present.
    pub fn stub(source_type: &str) -> Self {
        Self { source_type: Some(source_type.to_string()), ..Default::default() }
    }
}

/// A source entry as found in a configuration file.
///
/// `api_key` and `token` are accepted only so that they can be discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSourceConfig {
    #[serde(flatten)]
    pub settings: SourceConfig,
    #[serde(default)]
    pub api_key: Option<Secret>,
    #[serde(default)]
    pub token: Option<Secret>,
}

/// `defaults` section of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDefaults {
    #[serde(default)]
    pub test_source: Option<String>,
    /// Free-form; resolved onto [`TestType`] with `Custom` as the fallback.
    #[serde(default)]
    pub test_type: Option<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
}

/// `logs` section of a configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogsConfig {
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Configuration as loaded from disk, before resolution
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub graph: Option<String>,
    #[serde(default)]
    pub staging_graph: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub api_key: Option<Secret>,
    #[serde(default)]
    pub sources: Option<BTreeMap<String, FileSourceConfig>>,
    #[serde(default)]
    pub defaults: Option<FileDefaults>,
    #[serde(default)]
    pub logs: Option<LogsConfig>,
}

impl FileConfig {
    /// Schema checks that serde alone cannot express.
    ///
    /// # Errors
    /// Returns `FarosError::Config` naming the offending field path.
    pub fn validate(&self) -> Result<()> {
        if let Some(raw) = &self.url {
            let parsed = url::Url::parse(raw)
                .map_err(|e| FarosError::Config(format!("url: invalid URL '{raw}': {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(FarosError::Config(format!(
                    "url: unsupported scheme '{}'",
                    parsed.scheme()
                )));
            }
        }

        for (field, value) in [("graph", &self.graph), ("origin", &self.origin)] {
            if matches!(value, Some(v) if v.trim().is_empty()) {
                return Err(FarosError::Config(format!("{field}: must not be empty")));
            }
        }

        if let Some(0) = self.defaults.as_ref().and_then(|d| d.concurrency) {
            return Err(FarosError::Config(
                "defaults.concurrency: must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Paths of secret-shaped fields present in the file.
    pub fn secret_field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if self.api_key.is_some() {
            paths.push("apiKey".to_string());
        }
        if let Some(sources) = &self.sources {
            for (name, source) in sources {
                if source.api_key.is_some() {
                    paths.push(format!("sources.{name}.apiKey"));
                }
                if source.token.is_some() {
                    paths.push(format!("sources.{name}.token"));
                }
            }
        }
        paths
    }
}

/// Values supplied on the command line. `None` means "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub api_key: Option<Secret>,
    pub url: Option<String>,
    pub graph: Option<String>,
    pub origin: Option<String>,
    pub concurrency: Option<usize>,
    pub log_level: Option<LogLevel>,
    pub dry_run: bool,
}

/// Immutable snapshot of environment variables.
///
/// Empty values are treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvVars(BTreeMap<String, String>);

impl EnvVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a variable unless it is already present.
    pub fn insert_if_absent(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.entry(key.into()).or_insert_with(|| value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for EnvVars {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Resolved `defaults` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    pub test_source: Option<String>,
    pub test_type: Option<TestType>,
    pub concurrency: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self { test_source: None, test_type: None, concurrency: DEFAULT_CONCURRENCY }
    }
}

/// Fully resolved configuration for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub url: String,
    pub graph: String,
    pub staging_graph: Option<String>,
    pub origin: String,
    pub api_key: Option<Secret>,
    pub sources: BTreeMap<String, SourceConfig>,
    pub defaults: Defaults,
    pub log_level: LogLevel,
}

impl Config {
    pub fn source(&self, name: &str) -> Option<&SourceConfig> {
        self.sources.get(name)
    }
}
