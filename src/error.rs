use http::StatusCode;

/// Failures of the token lifecycle check, one variant per kind of fault.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("config: {0}")]
    Config(String),

    #[error("failed to connect to store at {addr}: {reason}")]
    Connection { addr: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    #[error("token validation failed with status: {status}")]
    Validation { status: StatusCode },

    #[error("failed to cache validation result: {reason}")]
    CacheWrite { reason: String },

    #[error("store {op} failed: {reason}")]
    Store { op: &'static str, reason: String },

    #[error("key '{0}' does not exist")]
    KeyNotFound(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn request(url: &str, err: reqwest::Error) -> Self {
        Error::Request {
            url: url.to_owned(),
            reason: err.to_string(),
        }
    }

    pub fn store(op: &'static str, err: impl std::fmt::Display) -> Self {
        Error::Store {
            op,
            reason: err.to_string(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Config(_) => "config",
            Error::Connection { .. } => "connection",
            Error::Request { .. } => "request",
            Error::Decode { .. } => "decode",
            Error::Validation { .. } => "validation",
            Error::CacheWrite { .. } => "cache_write",
            Error::Store { .. } => "store",
            Error::KeyNotFound(_) => "key_not_found",
        }
    }
}
