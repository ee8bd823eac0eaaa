//! Layered configuration resolution
//!
//! Non-secret fields follow CLI > environment > file > default. Secrets come
//! from the environment or CLI only; any secret found in the file is dropped
//! before merging.

use std::collections::BTreeMap;

use faros_common::Logger;
use faros_domain::constants::{
    DEFAULT_API_URL, DEFAULT_GRAPH, DEFAULT_ORIGIN, ENV_API_KEY, ENV_GRAPH, ENV_ORIGIN, ENV_URL,
    SOURCE_CREDENTIAL_VARS, STAGING_GRAPH_SUFFIX,
};
use faros_domain::{
    CliOverrides, Config, Defaults, EnvVars, FarosError, FileConfig, LogLevel, Result, Secret,
    SourceConfig, TestType,
};
use tracing::{debug, warn};

/// Merges file, environment and CLI inputs into one immutable [`Config`].
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    logger: Logger,
}

impl ConfigResolver {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Resolve the configuration for this invocation.
    ///
    /// # Errors
    /// `FarosError::Config` when no configuration file was found or the file
    /// fails schema validation.
    pub fn resolve(
        &self,
        file: Option<FileConfig>,
        cli: &CliOverrides,
        env: &EnvVars,
    ) -> Result<Config> {
        self.logger.in_scope(|| resolve_inner(file, cli, env))
    }
}

fn resolve_inner(file: Option<FileConfig>, cli: &CliOverrides, env: &EnvVars) -> Result<Config> {
    let file = file.ok_or_else(|| {
        FarosError::Config(
            "configuration file not found: create faros.config.yaml (or .farosrc) in the \
             working directory, or pass an explicit config path"
                .to_string(),
        )
    })?;
    file.validate()?;

    for path in file.secret_field_paths() {
        warn!(
            field = %path,
            "ignoring credential found in configuration file; set it via environment or CLI"
        );
    }

    let FileConfig { url, graph, staging_graph, origin, api_key: _, sources, defaults, logs } =
        file;

    let url = layered(cli.url.as_deref(), env.get(ENV_URL), url, DEFAULT_API_URL);
    let graph = layered(cli.graph.as_deref(), env.get(ENV_GRAPH), graph, DEFAULT_GRAPH);
    let origin = layered(cli.origin.as_deref(), env.get(ENV_ORIGIN), origin, DEFAULT_ORIGIN);

    let api_key = cli
        .api_key
        .clone()
        .filter(|key| !key.is_empty())
        .or_else(|| env.get(ENV_API_KEY).map(Secret::from));

    let mut resolved_sources: BTreeMap<String, SourceConfig> = sources
        .unwrap_or_default()
        .into_iter()
        .map(|(name, source)| (name, source.settings))
        .collect();
    synthesize_sources(&mut resolved_sources, env);

    let file_defaults = defaults.unwrap_or_default();
    let resolved_defaults = Defaults {
        test_source: file_defaults.test_source,
        test_type: file_defaults.test_type.as_deref().map(resolve_test_type),
        concurrency: cli
            .concurrency
            .filter(|n| *n > 0)
            .or(file_defaults.concurrency)
            .unwrap_or(Defaults::default().concurrency),
    };

    let log_level = resolve_log_level(cli.log_level, logs.and_then(|l| l.level));

    let config = Config {
        url,
        graph,
        staging_graph,
        origin,
        api_key,
        sources: resolved_sources,
        defaults: resolved_defaults,
        log_level,
    };

    debug!(
        url = %config.url,
        graph = %config.graph,
        origin = %config.origin,
        has_api_key = config.api_key.is_some(),
        sources = ?config.sources.keys().collect::<Vec<_>>(),
        concurrency = config.defaults.concurrency,
        "configuration resolved"
    );

    Ok(config)
}

/// Known test types match case-insensitively; anything else is `Custom`.
fn resolve_test_type(raw: &str) -> TestType {
    raw.parse::<TestType>().unwrap_or_else(|_| {
        debug!(test_type = %raw, "unrecognized defaults.testType; using Custom");
        TestType::Custom
    })
}

fn layered(cli: Option<&str>, env: Option<&str>, file: Option<String>, default: &str) -> String {
    cli.filter(|v| !v.is_empty())
        .or(env)
        .map(str::to_string)
        .or(file)
        .unwrap_or_else(|| default.to_string())
}

/// Add a `{ type }` stub for every source whose credential variable is set.
/// Existing entries are left untouched.
fn synthesize_sources(sources: &mut BTreeMap<String, SourceConfig>, env: &EnvVars) {
    for (variable, name, source_type) in SOURCE_CREDENTIAL_VARS {
        if env.contains(variable) && !sources.contains_key(*name) {
            debug!(source = %name, "synthesized source entry from credential variable");
            sources.insert((*name).to_string(), SourceConfig::stub(source_type));
        }
    }
}

/// Graph used for dry-run writes.
pub fn resolve_staging_graph(config: &Config) -> String {
    match &config.staging_graph {
        Some(staging) if !staging.is_empty() => staging.clone(),
        _ => format!("{}{STAGING_GRAPH_SUFFIX}", config.graph),
    }
}

/// Graph a command should write to.
pub fn target_graph(config: &Config, dry_run: bool) -> String {
    if dry_run {
        resolve_staging_graph(config)
    } else {
        config.graph.clone()
    }
}

/// CLI level, then the file's `logs.level`, then `info`.
pub fn resolve_log_level(cli: Option<LogLevel>, file: Option<LogLevel>) -> LogLevel {
    cli.or(file).unwrap_or_default()
}
