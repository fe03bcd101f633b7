use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque bearer credential issued by the token service.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// never print the credential itself
impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(len={})", self.0.len())
    }
}

/// Outcome of validating a token against the issuing service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub expires_at: String,
    pub token_name: String,
    pub valid: bool,
}

/// `POST {token_endpoint}` response
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
}

/// `GET /token/validate` response
#[derive(Debug, Deserialize)]
pub(crate) struct ValidateResponse {
    pub expires_at: Option<String>,
    pub token_name: Option<String>,
}

/// `POST {cache_endpoint}` body
#[derive(Debug, Serialize)]
pub(crate) struct CacheRequest<'a> {
    pub token: &'a str,
    pub valid: bool,
}
