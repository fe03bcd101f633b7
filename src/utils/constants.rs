//! Shared constants and invariants

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

// Token service
pub const DEFAULT_TOKEN_ENDPOINT: &str = "/token";
pub const FIXED_TOKEN_VALIDATE_PATH: &str = "/token/validate";
pub const DEFAULT_CACHE_ENDPOINT: &str = "/cache/validation_result";

// Remote store
pub const DEFAULT_REDIS_HOST: &str = "localhost";
pub const DEFAULT_REDIS_PORT: u16 = 6379;
pub const DEFAULT_VALIDATION_RESULT_KEY: &str = "validation_result";

// Environment overrides
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";
pub const ENV_PODINFO_BASE_URL: &str = "PODINFO_BASE_URL";
pub const ENV_PODINFO_TOKEN_ENDPOINT: &str = "PODINFO_TOKEN_ENDPOINT";
pub const ENV_PODINFO_TOKEN_VALIDATE_PATH: &str = "PODINFO_TOKEN_VALIDATE_PATH";
pub const ENV_PODINFO_CACHE_ENDPOINT: &str = "PODINFO_CACHE_ENDPOINT";
pub const ENV_PODINFO_VALIDATE_ROUTE: &str = "PODINFO_VALIDATE_ROUTE";
pub const ENV_PODINFO_DECODE: &str = "PODINFO_DECODE";
pub const ENV_PODINFO_TIMEOUT_MS: &str = "PODINFO_TIMEOUT_MS";
pub const ENV_REDIS_HOST: &str = "REDIS_HOST";
pub const ENV_REDIS_PORT: &str = "REDIS_PORT";
pub const ENV_REDIS_PASSWORD: &str = "REDIS_PASSWORD";
pub const ENV_REDIS_VALIDATION_RESULT_KEY: &str = "REDIS_VALIDATION_RESULT_KEY";
pub const ENV_REDIS_TIMEOUT_MS: &str = "REDIS_TIMEOUT_MS";
pub const ENV_REDIS_CLEANUP: &str = "REDIS_CLEANUP";
pub const ENV_METRICS_TEXTFILE_PATH: &str = "METRICS_TEXTFILE_PATH";
