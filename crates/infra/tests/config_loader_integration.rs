//! Integration tests for configuration loading
//!
//! Exercises discovery on disk, `.env` snapshots and resolution together, the
//! way the process entry point wires them.

use std::fs;
use std::sync::Mutex;

use faros_common::observability::Logger;
use faros_core::ConfigResolver;
use faros_domain::{CliOverrides, EnvVars, FarosError, LogLevel, Secret};
use faros_infra::config;
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Guards tests that change the process working directory.
static CWD_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const CONFIG_WITH_SECRETS: &str = r#"
url: https://staging.api.faros.ai
graph: from-file
apiKey: file-key
sources:
  linear:
    type: Linear
    cutoffDays: 14
    apiKey: linear-file-key
logs:
  level: warn
"#;

fn resolver() -> ConfigResolver {
    ConfigResolver::new(Logger::silent())
}

#[test]
fn test_file_secrets_never_reach_resolved_config() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("faros.config.yaml"), CONFIG_WITH_SECRETS).expect("write config");
    fs::write(dir.path().join(".env"), "LINEAR_API_KEY=from-dotenv\n").expect("write env");

    let file = config::discover(dir.path(), &Logger::silent()).expect("valid config");
    let env = config::load_env_from(dir.path(), Vec::new(), &Logger::silent()).expect("valid env");
    let resolved = resolver().resolve(file, &CliOverrides::default(), &env).expect("resolved");

    assert_eq!(resolved.api_key, None);
    assert_eq!(resolved.url, "https://staging.api.faros.ai");
    assert_eq!(resolved.graph, "from-file");
    assert_eq!(resolved.log_level, LogLevel::Warn);

    let linear = resolved.source("linear").expect("linear source kept");
    assert_eq!(linear.source_type.as_deref(), Some("Linear"));
    assert_eq!(linear.cutoff_days, Some(14));
}

#[test]
fn test_precedence_cli_over_env_over_file() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join(".farosrc.json"), r#"{"graph": "file", "origin": "file"}"#)
        .expect("write config");
    fs::write(dir.path().join(".env"), "FAROS_GRAPH=dotenv\nFAROS_ORIGIN=dotenv\n")
        .expect("write env");

    let process = vec![("FAROS_ORIGIN".to_string(), "process".to_string())];
    let env = config::load_env_from(dir.path(), process, &Logger::silent()).expect("valid env");
    let cli = CliOverrides {
        graph: Some("cli".into()),
        api_key: Some(Secret::from("cli-key")),
        ..CliOverrides::default()
    };

    let resolved = resolver()
        .resolve(config::discover(dir.path(), &Logger::silent()).expect("valid config"), &cli, &env)
        .expect("resolved");

    assert_eq!(resolved.graph, "cli");
    assert_eq!(resolved.origin, "process");
    assert_eq!(resolved.api_key.as_ref().map(Secret::expose), Some("cli-key"));
    assert_eq!(resolved.url, "https://prod.api.faros.ai");
}

#[test]
fn test_toml_config_discovered() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(
        dir.path().join("faros.config.toml"),
        "graph = \"toml-graph\"\n[defaults]\nconcurrency = 3\n",
    )
    .expect("write config");

    let env = EnvVars::new().with("FAROS_API_KEY", "env-key");
    let file = config::discover(dir.path(), &Logger::silent()).expect("valid config");
    let resolved = resolver().resolve(file, &CliOverrides::default(), &env).expect("resolved");

    assert_eq!(resolved.graph, "toml-graph");
    assert_eq!(resolved.defaults.concurrency, 3);
    assert_eq!(resolved.api_key.as_ref().map(Secret::expose), Some("env-key"));
}

#[test]
fn test_missing_config_is_actionable_error() {
    let dir = TempDir::new().expect("temp dir");
    let file = config::discover(dir.path(), &Logger::silent()).expect("empty dir is not an error");

    let err = resolver().resolve(file, &CliOverrides::default(), &EnvVars::new()).unwrap_err();
    assert!(matches!(err, FarosError::Config(msg) if msg.contains("faros.config.yaml")));
}

#[test]
fn test_invalid_schema_names_field() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("faros.config.yml"), "defaults:\n  concurrency: 0\n")
        .expect("write config");

    let err = config::discover(dir.path(), &Logger::silent()).unwrap_err();
    assert!(matches!(err, FarosError::Config(msg) if msg.contains("defaults.concurrency")));
}

#[test]
fn test_load_searches_working_directory() {
    let _guard = CWD_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let original = std::env::current_dir().expect("cwd");

    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join(".farosrc.yml"), "graph: cwd-graph\n").expect("write config");
    std::env::set_current_dir(dir.path()).expect("chdir");

    let loaded = config::load(None, &Logger::silent());
    std::env::set_current_dir(original).expect("restore cwd");

    let file = loaded.expect("valid config").expect("config discovered");
    assert_eq!(file.graph.as_deref(), Some("cwd-graph"));
}

#[test]
fn test_explicit_path_overrides_discovery() {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("faros.config.yaml"), "graph: discovered\n").expect("write");
    let explicit = dir.path().join("custom.json");
    fs::write(&explicit, r#"{"graph": "explicit"}"#).expect("write");

    let file = config::load(Some(explicit), &Logger::silent()).expect("valid").expect("present");
    assert_eq!(file.graph.as_deref(), Some("explicit"));
}
