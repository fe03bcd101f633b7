//! # Podinfo Token Validator
//!
//! Exercises a token service's lifecycle end to end: request a token,
//! validate it, have the service cache the validation result, and confirm
//! the cached record is observable in Redis.
//!
//! Modules:
//! - `config` — YAML configuration, environment overrides and validation
//! - `podinfo` — token service HTTP client
//! - `store` — remote key-value store access
//! - `workflow` — the fail-fast four-stage state machine

pub mod config;
pub mod error;
pub mod helpers;
pub mod observability;
pub mod podinfo;
pub mod store;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod tests;

pub use crate::config::service::ServiceConfig;
pub use crate::error::{Error, Result};
