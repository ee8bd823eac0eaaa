//! # Faros Sync Infrastructure
//!
//! Impure adapters behind the ports defined in `faros-core`.
//!
//! This crate contains:
//! - Configuration file discovery and parsing (YAML, JSON, TOML)
//! - The `.env` plus process environment snapshot
//! - The HTTP transport and the events API client
//! - Logger construction (stderr and JSON file)

#![forbid(unsafe_code)]

pub mod api;
pub mod config;
pub mod http;
pub mod observability;

pub use api::{create_client, EventClient};
pub use config::{load, load_env};
pub use http::HttpClient;
pub use observability::{console_logger, file_logger};
