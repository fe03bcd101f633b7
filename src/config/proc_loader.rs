use std::path::Path;
use std::str::FromStr;

use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::service::{DecodeMode, ServiceConfig, ValidateRoute};
use crate::config::settings::LogFormat;
use crate::error::{Error, Result};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::*;

/// Load, override from the environment and validate config from a YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "configuration file not found: {}",
            path.display()
        )));
    }
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::Config(format!("error reading config file {}: {}", path.display(), e))
    })?;

    let expanded = expand_env_vars(&content)?;
    parse_config(expanded, |key| std::env::var(key).ok()).await
}

/// Parse YAML, apply overrides from `lookup` and validate the result.
pub async fn parse_config<F>(content: String, lookup: F) -> Result<ServiceConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let metrics = get_metrics().await;
    let mut service_config: ServiceConfig = serde_yaml::from_str(&content)
        .map_err(|e| {
            error!("parse config error: {}", e);
            metrics.config_errors.inc();
            Error::Config(format!("unable to decode config: {}", e))
        })?;

    apply_env_overrides(&mut service_config, lookup)
        .inspect_err(|_| metrics.config_errors.inc())?;

    debug!("validation config ...");
    proc_validator::validate_service_config(&service_config)
        .await
        .map_err(|errors| Error::Config(format!("config is not valid: {}", errors.join("; "))))?;

    Ok(service_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")
        .map_err(|e| Error::Config(e.to_string()))?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.to_string())
}

/// Each config field can be replaced by its environment variable.
/// Empty values are treated as unset, except `REDIS_PASSWORD` where an empty
/// value clears the password.
pub fn apply_env_overrides<F>(config: &mut ServiceConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.log.level = level.to_lowercase();
    }
    if let Some(format) = get(ENV_LOG_FORMAT) {
        config.log.format = LogFormat::parse(&format)
            .ok_or_else(|| invalid_value(ENV_LOG_FORMAT, &format))?;
    }

    let podinfo = &mut config.podinfo;
    if let Some(base_url) = get(ENV_PODINFO_BASE_URL) {
        podinfo.base_url = base_url;
    }
    if let Some(endpoint) = get(ENV_PODINFO_TOKEN_ENDPOINT) {
        podinfo.token_endpoint = endpoint;
    }
    if let Some(path) = get(ENV_PODINFO_TOKEN_VALIDATE_PATH) {
        podinfo.token_validate = path;
    }
    if let Some(endpoint) = get(ENV_PODINFO_CACHE_ENDPOINT) {
        podinfo.cache_endpoint = endpoint;
    }
    if let Some(route) = get(ENV_PODINFO_VALIDATE_ROUTE) {
        podinfo.validate_route = ValidateRoute::parse(&route)
            .ok_or_else(|| invalid_value(ENV_PODINFO_VALIDATE_ROUTE, &route))?;
    }
    if let Some(decode) = get(ENV_PODINFO_DECODE) {
        podinfo.decode = DecodeMode::parse(&decode)
            .ok_or_else(|| invalid_value(ENV_PODINFO_DECODE, &decode))?;
    }
    if let Some(timeout) = get(ENV_PODINFO_TIMEOUT_MS) {
        podinfo.timeout_ms = Some(parse_env(ENV_PODINFO_TIMEOUT_MS, &timeout)?);
    }

    let redis = &mut config.redis;
    if let Some(host) = get(ENV_REDIS_HOST) {
        redis.host = host;
    }
    if let Some(port) = get(ENV_REDIS_PORT) {
        redis.port = parse_env(ENV_REDIS_PORT, &port)?;
    }
    if let Some(password) = lookup(ENV_REDIS_PASSWORD) {
        redis.password = password;
    }
    if let Some(key) = get(ENV_REDIS_VALIDATION_RESULT_KEY) {
        redis.validation_result_key = key;
    }
    if let Some(timeout) = get(ENV_REDIS_TIMEOUT_MS) {
        redis.timeout_ms = Some(parse_env(ENV_REDIS_TIMEOUT_MS, &timeout)?);
    }
    if let Some(cleanup) = get(ENV_REDIS_CLEANUP) {
        redis.cleanup = parse_env(ENV_REDIS_CLEANUP, &cleanup.to_lowercase())?;
    }

    if let Some(path) = get(ENV_METRICS_TEXTFILE_PATH) {
        config.metrics.textfile_path = Some(path);
    }
    Ok(())
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| invalid_value(key, value))
}

fn invalid_value(key: &str, value: &str) -> Error {
    Error::Config(format!("invalid value '{}' for {}", value, key))
}
