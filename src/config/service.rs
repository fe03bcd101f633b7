use serde::Deserialize;

use crate::config::settings::{LoggingConfig, MetricsConfig};
use crate::utils::constants::{
    DEFAULT_CACHE_ENDPOINT, DEFAULT_REDIS_HOST, DEFAULT_REDIS_PORT, DEFAULT_TOKEN_ENDPOINT,
    DEFAULT_VALIDATION_RESULT_KEY, FIXED_TOKEN_VALIDATE_PATH,
};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub log: LoggingConfig,
    pub podinfo: PodinfoConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// ================================
/// Token service (podinfo)
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PodinfoConfig {
    pub base_url: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    /// Only used when `validate_route` is `configured`.
    #[serde(default = "default_token_validate")]
    pub token_validate: String,
    #[serde(default = "default_cache_endpoint")]
    pub cache_endpoint: String,
    #[serde(default)]
    pub validate_route: ValidateRoute,
    #[serde(default)]
    pub decode: DecodeMode,
    /// Whole-request timeout; the client default (none) applies when unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PodinfoConfig {
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, self.token_endpoint)
    }

    pub fn validate_url(&self) -> String {
        let path = match self.validate_route {
            ValidateRoute::Fixed => FIXED_TOKEN_VALIDATE_PATH,
            ValidateRoute::Configured => self.token_validate.as_str(),
        };
        format!("{}{}", self.base_url, path)
    }

    pub fn cache_url(&self) -> String {
        format!("{}{}", self.base_url, self.cache_endpoint)
    }
}

/// Which path the validate call is sent to.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidateRoute {
    /// Always `/token/validate`, regardless of `token_validate`.
    #[default]
    Fixed,
    /// The configured `token_validate` path.
    Configured,
}

impl ValidateRoute {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "fixed" => Some(ValidateRoute::Fixed),
            "configured" => Some(ValidateRoute::Configured),
            _ => None,
        }
    }
}

/// How missing fields in token service responses are treated.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DecodeMode {
    /// Missing fields decode as empty strings.
    #[default]
    Lenient,
    /// Missing fields are decode errors.
    Strict,
}

impl DecodeMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "lenient" => Some(DecodeMode::Lenient),
            "strict" => Some(DecodeMode::Strict),
            _ => None,
        }
    }
}

/// ================================
/// Remote store (redis)
/// ================================
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct RedisConfig {
    #[serde(default = "default_redis_host")]
    pub host: String,
    #[serde(default = "default_redis_port")]
    pub port: u16,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_validation_result_key")]
    pub validation_result_key: String,
    /// Applied to every store round trip when set.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Delete the validation key after a successful read-back.
    #[serde(default)]
    pub cleanup: bool,
}

impl RedisConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn url(&self) -> String {
        format!("redis://{}/0", self.addr())
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: default_redis_host(),
            port: default_redis_port(),
            password: String::new(),
            validation_result_key: default_validation_result_key(),
            timeout_ms: None,
            cleanup: false,
        }
    }
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_token_validate() -> String {
    FIXED_TOKEN_VALIDATE_PATH.to_string()
}

fn default_cache_endpoint() -> String {
    DEFAULT_CACHE_ENDPOINT.to_string()
}

fn default_redis_host() -> String {
    DEFAULT_REDIS_HOST.to_string()
}

fn default_redis_port() -> u16 {
    DEFAULT_REDIS_PORT
}

fn default_validation_result_key() -> String {
    DEFAULT_VALIDATION_RESULT_KEY.to_string()
}
