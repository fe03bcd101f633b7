//! Client for the token service (podinfo): issue, validate and cache.

pub mod client;
pub mod model;

pub use client::TokenService;
pub use model::{Token, ValidationResult};
