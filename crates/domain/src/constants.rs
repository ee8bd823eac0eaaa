//! Domain constants
//!
//! Defaults applied when neither the CLI, the environment nor the
//! configuration file supplies a value.

pub const DEFAULT_API_URL: &str = "https://prod.api.faros.ai";
pub const DEFAULT_GRAPH: &str = "default";
pub const DEFAULT_ORIGIN: &str = "faros-cli";
pub const DEFAULT_CONCURRENCY: usize = 8;
pub const STAGING_GRAPH_SUFFIX: &str = "-staging";

// Event envelope
pub const EVENT_SCHEMA_VERSION: &str = "0.0.1";
pub const DEFAULT_TEST_SOURCE: &str = "Unknown";

// Environment variables
pub const ENV_API_KEY: &str = "FAROS_API_KEY";
pub const ENV_URL: &str = "FAROS_URL";
pub const ENV_GRAPH: &str = "FAROS_GRAPH";
pub const ENV_ORIGIN: &str = "FAROS_ORIGIN";
pub const ENV_LINEAR_API_KEY: &str = "LINEAR_API_KEY";
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

/// Credential environment variables whose presence makes a source usable,
/// as `(variable, source name, source type)`.
pub const SOURCE_CREDENTIAL_VARS: &[(&str, &str, &str)] =
    &[(ENV_LINEAR_API_KEY, "linear", "Linear"), (ENV_GITHUB_TOKEN, "github", "GitHub")];

// Failure listing shown to users after a batch upload
pub const FAILURE_LISTING_LIMIT: usize = 5;
