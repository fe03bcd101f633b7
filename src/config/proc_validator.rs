//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Validates invariants the workflow relies on:
//!   * token service base URL and endpoint paths
//!   * store address and validation key
//!   * logging level and optional timeouts

use tracing::{error, info};

use crate::config::service::{PodinfoConfig, RedisConfig, ServiceConfig};
use crate::config::settings::LoggingConfig;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 4] = ["debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_logging(&cfg.log, &mut errors);
    validate_podinfo(&cfg.podinfo, &mut errors);
    validate_redis(&cfg.redis, &mut errors);

    if let Some(path) = &cfg.metrics.textfile_path {
        if path.trim().is_empty() {
            errors.push("metrics.textfile_path must not be empty when set".to_string());
        }
    }

    if errors.is_empty() {
        info!("config valid");
        Ok(())
    } else {
        error!("configuration validation errors ({}):", errors.len());
        for e in &errors {
            error!(" - {}", e);
        }
        get_metrics().await.config_errors.inc();
        Err(errors)
    }
}

/// LOGGING VALIDATION
fn validate_logging(log: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&log.level.to_lowercase().as_str()) {
        errors.push(format!(
            "log.level '{}' must be one of {}",
            log.level,
            LOG_LEVELS.join(", ")
        ));
    }
}

/// TOKEN SERVICE VALIDATION
fn validate_podinfo(podinfo: &PodinfoConfig, errors: &mut Vec<String>) {
    if podinfo.base_url.trim().is_empty() {
        errors.push("podinfo.base_url must not be empty".to_string());
    } else if !podinfo.base_url.starts_with("http://") && !podinfo.base_url.starts_with("https://") {
        errors.push(format!(
            "podinfo.base_url '{}' must start with http:// or https://",
            podinfo.base_url
        ));
    } else if podinfo.base_url.ends_with('/') {
        errors.push(format!(
            "podinfo.base_url '{}' must not end with '/'",
            podinfo.base_url
        ));
    }

    for (name, path) in [
        ("podinfo.token_endpoint", &podinfo.token_endpoint),
        ("podinfo.token_validate", &podinfo.token_validate),
        ("podinfo.cache_endpoint", &podinfo.cache_endpoint),
    ] {
        if !path.starts_with('/') {
            errors.push(format!("{} '{}' must start with '/'", name, path));
        }
    }

    if podinfo.timeout_ms == Some(0) {
        errors.push("podinfo.timeout_ms must be greater than 0".to_string());
    }
}

/// REMOTE STORE VALIDATION
fn validate_redis(redis: &RedisConfig, errors: &mut Vec<String>) {
    if redis.host.trim().is_empty() {
        errors.push("redis.host must not be empty".to_string());
    }
    if redis.port == 0 {
        errors.push("redis.port must be greater than 0".to_string());
    }
    if redis.validation_result_key.trim().is_empty() {
        errors.push("redis.validation_result_key must not be empty".to_string());
    }
    if redis.timeout_ms == Some(0) {
        errors.push("redis.timeout_ms must be greater than 0".to_string());
    }
}
