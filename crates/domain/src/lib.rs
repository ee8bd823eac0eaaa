//! # Faros Domain
//!
//! Business domain types for the Faros event sync engine.
//!
//! This crate contains:
//! - Configuration structures (file, CLI, environment, resolved)
//! - The event envelope and its CI, CD and test-execution payloads
//! - Parsed test-suite input types
//! - Upload batch units and results
//! - Domain error types and Result definitions
//!
//! ## Architecture
//! - No dependencies on other Faros crates
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
