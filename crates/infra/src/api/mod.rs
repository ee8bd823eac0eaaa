//! Faros API access

pub mod client;

pub use client::{create_client, EventClient, EventClientBuilder};
