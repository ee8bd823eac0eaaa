//! Configuration loading
//!
//! Reads the configuration file and the environment. Resolution into a
//! `Config` is done by `faros_core::ConfigResolver`.

pub mod env;
pub mod loader;

pub use env::{load_env, load_env_from};
pub use loader::{discover, find_config_path, load, load_from_file, parse_config};
