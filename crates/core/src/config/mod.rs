//! Configuration resolution
//!
//! Loading files and reading the process environment are infra concerns.
//! This module only merges already-loaded inputs.

pub mod resolver;

pub use resolver::{resolve_log_level, resolve_staging_graph, target_graph, ConfigResolver};
