//! Linear connector sync planning
//!
//! Resolves everything the external connector runner needs: images, source
//! and destination configs, streams and runner flags. Spawning the runner is
//! delegated to an [`ExternalSyncRunner`].

use std::fmt;
use std::path::PathBuf;

use faros_common::{redact_json, Logger};
use faros_domain::constants::ENV_LINEAR_API_KEY;
use faros_domain::{Config, EnvVars, FarosError, LogLevel, Result, Secret};
use serde_json::{json, Map, Value};
use tracing::{error, info};

use super::ports::ExternalSyncRunner;
use crate::config::target_graph;

pub const DEFAULT_LINEAR_SRC_IMAGE: &str = "farosai/airbyte-linear-source";
pub const DEFAULT_FAROS_DST_IMAGE: &str = "farosai/airbyte-faros-destination";
pub const DEFAULT_CONNECTION_NAME: &str = "mylinearsrc";
pub const LINEAR_STREAMS: &[&str] = &["teams", "users", "projects", "issues", "comments"];

const LINEAR_SOURCE: &str = "linear";

/// Sync mode passed to the connector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncMode {
    FullRefresh,
    Incremental,
}

impl SyncMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullRefresh => "full_refresh",
            Self::Incremental => "incremental",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Command-line options for a Linear sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearSyncOptions {
    pub linear_api_key: Option<Secret>,
    pub cutoff_days: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Comma-separated stream list
    pub streams: Option<String>,
    pub full_refresh: bool,
    pub connection_name: Option<String>,
    /// Passed through to the runner untouched
    pub state_file: Option<PathBuf>,
    pub check_connection: bool,
    pub src_image: Option<String>,
    pub dst_image: Option<String>,
    pub keep_containers: bool,
    pub log_level: Option<LogLevel>,
    pub raw_messages: bool,
    pub no_src_pull: bool,
    pub no_dst_pull: bool,
    pub debug: bool,
    pub dry_run: bool,
}

/// Fully resolved connector run
#[derive(Clone, PartialEq)]
pub struct LinearSyncPlan {
    pub src_image: String,
    pub dst_image: String,
    pub src_config: Value,
    pub dst_config: Value,
    pub graph: String,
    pub origin: String,
    pub streams: Vec<String>,
    pub mode: SyncMode,
    pub connection_name: String,
    pub runner_args: Vec<String>,
    pub dry_run: bool,
}

impl LinearSyncPlan {
    /// Resolve a plan from configuration, options and environment.
    ///
    /// # Errors
    /// - `FarosError::Config` when the Linear or Faros API key is missing
    /// - `FarosError::Validation` when an unknown stream is requested
    pub fn build(config: &Config, options: &LinearSyncOptions, env: &EnvVars) -> Result<Self> {
        let entry = config.source(LINEAR_SOURCE);
        let linear_key = options
            .linear_api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| env.get(ENV_LINEAR_API_KEY).map(Secret::from));

        if entry.is_none() && linear_key.is_none() {
            return Err(FarosError::Config(
                "no Linear source configuration found: add a \"linear\" entry under \"sources\" \
                 in faros.config.yaml, or provide --linear-api-key"
                    .to_string(),
            ));
        }
        let linear_key = linear_key.ok_or_else(|| {
            FarosError::Config(format!(
                "Linear API key is required: provide --linear-api-key or set {ENV_LINEAR_API_KEY}"
            ))
        })?;
        let faros_key = config.api_key.as_ref().filter(|key| !key.is_empty()).ok_or_else(|| {
            FarosError::Config(
                "Faros API key is required: provide --api-key or set FAROS_API_KEY".to_string(),
            )
        })?;

        let src_image = options
            .src_image
            .clone()
            .or_else(|| entry.and_then(|e| e.src_image.clone()))
            .unwrap_or_else(|| DEFAULT_LINEAR_SRC_IMAGE.to_string());
        let dst_image = options
            .dst_image
            .clone()
            .or_else(|| entry.and_then(|e| e.dst_image.clone()))
            .unwrap_or_else(|| DEFAULT_FAROS_DST_IMAGE.to_string());

        let streams = resolve_streams(options, entry.and_then(|e| e.streams.as_deref()))?;
        let mode = if options.full_refresh { SyncMode::FullRefresh } else { SyncMode::Incremental };
        let connection_name = options
            .connection_name
            .clone()
            .or_else(|| entry.and_then(|e| e.connection_name.clone()))
            .unwrap_or_else(|| DEFAULT_CONNECTION_NAME.to_string());

        let mut src_config = Map::new();
        src_config.insert("api_key".into(), Value::String(linear_key.expose().to_string()));
        if let Some(days) = options.cutoff_days.or_else(|| entry.and_then(|e| e.cutoff_days)) {
            src_config.insert("cutoff_days".into(), json!(days));
        }
        let start_date =
            options.start_date.clone().or_else(|| entry.and_then(|e| e.start_date.clone()));
        if let Some(start) = start_date.filter(|d| !d.is_empty()) {
            src_config.insert("start_date".into(), Value::String(start));
        }
        let end_date =
            options.end_date.clone().or_else(|| entry.and_then(|e| e.end_date.clone()));
        if let Some(end) = end_date.filter(|d| !d.is_empty()) {
            src_config.insert("end_date".into(), Value::String(end));
        }

        let graph = target_graph(config, options.dry_run);
        let dst_config = json!({
            "edition_configs": {
                "edition": "cloud",
                "api_key": faros_key.expose(),
                "api_url": config.url,
                "graph": graph,
            },
            "origin": config.origin,
        });

        let log_level = match (options.log_level, options.debug) {
            (Some(level), _) => level,
            (None, true) => LogLevel::Debug,
            (None, false) => config.log_level,
        };
        let runner_args = runner_args(options, &connection_name, log_level);

        Ok(Self {
            src_image,
            dst_image,
            src_config: Value::Object(src_config),
            dst_config,
            graph,
            origin: config.origin.clone(),
            streams,
            mode,
            connection_name,
            runner_args,
            dry_run: options.dry_run,
        })
    }

    /// Connector config document handed to the runner:
    /// `{src: {image, config}, dst: {image, config}}`.
    pub fn connector_config(&self) -> Value {
        json!({
            "src": { "image": self.src_image, "config": self.src_config },
            "dst": { "image": self.dst_image, "config": self.dst_config },
        })
    }
}

impl fmt::Debug for LinearSyncPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinearSyncPlan")
            .field("src_image", &self.src_image)
            .field("dst_image", &self.dst_image)
            .field("src_config", &redact_json(&self.src_config))
            .field("dst_config", &redact_json(&self.dst_config))
            .field("graph", &self.graph)
            .field("origin", &self.origin)
            .field("streams", &self.streams)
            .field("mode", &self.mode)
            .field("connection_name", &self.connection_name)
            .field("runner_args", &self.runner_args)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

fn resolve_streams(
    options: &LinearSyncOptions,
    configured: Option<&[String]>,
) -> Result<Vec<String>> {
    let requested: Vec<String> = match (&options.streams, configured) {
        (Some(list), _) => list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        (None, Some(configured)) => configured.to_vec(),
        (None, None) => LINEAR_STREAMS.iter().map(|s| s.to_string()).collect(),
    };

    let invalid: Vec<&str> = requested
        .iter()
        .map(String::as_str)
        .filter(|stream| !LINEAR_STREAMS.contains(stream))
        .collect();
    if !invalid.is_empty() {
        return Err(FarosError::Validation(format!(
            "invalid stream(s): {}. Valid streams: {}",
            invalid.join(", "),
            LINEAR_STREAMS.join(", ")
        )));
    }
    Ok(requested)
}

fn runner_args(
    options: &LinearSyncOptions,
    connection_name: &str,
    log_level: LogLevel,
) -> Vec<String> {
    let mut args = Vec::new();
    if options.full_refresh {
        args.push("--full-refresh".to_string());
    }
    if options.check_connection {
        args.push("--src-check-connection".to_string());
    }
    args.push("--connection-name".to_string());
    args.push(connection_name.to_string());
    if let Some(state_file) = &options.state_file {
        args.push("--state-file".to_string());
        args.push(state_file.display().to_string());
    }
    if options.keep_containers {
        args.push("--keep-containers".to_string());
    }
    args.push("--log-level".to_string());
    args.push(log_level.as_str().to_string());
    for (enabled, flag) in [
        (options.raw_messages, "--raw-messages"),
        (options.no_src_pull, "--no-src-pull"),
        (options.no_dst_pull, "--no-dst-pull"),
        (options.debug, "--debug"),
    ] {
        if enabled {
            args.push(flag.to_string());
        }
    }
    args
}

/// Run the plan through `runner`.
///
/// # Errors
/// Propagates runner errors; a non-zero exit code becomes
/// `FarosError::Internal`.
pub async fn run_linear_sync(
    runner: &dyn ExternalSyncRunner,
    plan: &LinearSyncPlan,
    logger: &Logger,
) -> Result<()> {
    logger
        .instrument(async {
            info!(
                src_image = %plan.src_image,
                dst_image = %plan.dst_image,
                graph = %plan.graph,
                origin = %plan.origin,
                streams = ?plan.streams,
                mode = %plan.mode,
                connection_name = %plan.connection_name,
                dry_run = plan.dry_run,
                "sync plan resolved"
            );

            let started = std::time::Instant::now();
            let exit_code = runner.run_external_sync(plan).await?;
            let duration_ms = started.elapsed().as_millis() as u64;

            if exit_code != 0 {
                error!(exit_code, duration_ms, "connector sync failed");
                return Err(FarosError::Internal(format!(
                    "connector runner exited with code {exit_code}"
                )));
            }

            info!(duration_ms, "connector sync completed");
            Ok(())
        })
        .await
}
