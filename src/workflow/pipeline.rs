use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::service::ServiceConfig;
use crate::error::{Error, Result};
use crate::helpers::time::{get_instant, now_i64, seconds_until};
use crate::observability::metrics::get_metrics;
use crate::podinfo::TokenService;
use crate::store::{RemoteStore, StoreConnector};
use crate::workflow::{RunReport, RunState, Stage, StageError};

/// Runs the stages strictly in sequence and stops at the first failure.
/// Nothing is retried and completed stages are never rolled back.
pub struct Workflow<'a, C: StoreConnector> {
    config: &'a ServiceConfig,
    service: TokenService<'a>,
    connector: C,
    state: RunState,
    stage_durations: Vec<(Stage, Duration)>,
}

impl<'a, C: StoreConnector> Workflow<'a, C> {
    pub fn new(config: &'a ServiceConfig, service: TokenService<'a>, connector: C) -> Self {
        Self {
            config,
            service,
            connector,
            state: RunState::Init,
            stage_durations: Vec::with_capacity(4),
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// One full, independent execution of the pipeline.
    pub async fn run(&mut self) -> std::result::Result<RunReport, StageError> {
        self.state = RunState::Init;
        self.stage_durations.clear();

        let result = self.run_stages().await;

        let metrics = get_metrics().await;
        metrics.last_run_success.set(i64::from(result.is_ok()));
        metrics.last_run_timestamp.set(now_i64());
        result
    }

    async fn run_stages(&mut self) -> std::result::Result<RunReport, StageError> {
        // -------------------------------
        // 1. Generate a token
        // -------------------------------
        info!("Generating token...");
        let started = get_instant();
        let result = self.service.generate_token().await;
        let token = self.complete(Stage::GenerateToken, started, result).await?;
        if token.is_empty() {
            warn!("token service returned an empty token");
        }
        info!("Token generated successfully.");

        // -------------------------------
        // 2. Validate the token
        // -------------------------------
        info!("Validating token...");
        let started = get_instant();
        let result = self.service.validate_token(&token).await;
        let validation = self.complete(Stage::ValidateToken, started, result).await?;
        info!(
            token_name = %validation.token_name,
            expires_at = %validation.expires_at,
            "Token validated"
        );
        if let Some(remaining) = seconds_until(&validation.expires_at, now_i64()) {
            info!("token expires in {} seconds", remaining);
        }

        // -------------------------------
        // 3. Cache the validation result
        // -------------------------------
        info!("Caching validation result...");
        let started = get_instant();
        let result = self.service.cache_validation_result(&token, validation.valid).await;
        self.complete(Stage::CacheResult, started, result).await?;
        info!("Validation result cached successfully.");

        // -------------------------------
        // 4. Read the cached result back from the store
        // -------------------------------
        info!("Verifying cached validation result in Redis...");
        debug!("read-back assumes the cache write is already visible in the store");
        let started = get_instant();
        let result = self.verify_cache().await;
        let cached_value_len = self.complete(Stage::VerifyCache, started, result).await?;

        Ok(RunReport {
            validation,
            key: self.config.redis.validation_result_key.to_owned(),
            cached_value_len,
            stage_durations: self.stage_durations.clone(),
        })
    }

    /// Opens the store connection for this stage only and closes it on every path.
    async fn verify_cache(&self) -> Result<usize> {
        let redis_config = &self.config.redis;
        let mut store = self.connector.connect(redis_config).await?;

        let result = read_back(&store, &redis_config.validation_result_key, redis_config.cleanup).await;

        if let Err(err) = store.close() {
            warn!("failed to close store connection: {}", err);
        }
        result
    }

    /// Record the stage outcome and move the state machine.
    async fn complete<T>(
        &mut self,
        stage: Stage,
        started: Instant,
        result: Result<T>,
    ) -> std::result::Result<T, StageError> {
        let elapsed = started.elapsed();
        let metrics = get_metrics().await;
        metrics.stage_attempts.with_label_values(&[stage.as_str()]).inc();
        metrics.stage_duration.with_label_values(&[stage.as_str()]).observe(elapsed.as_secs_f64());
        self.stage_durations.push((stage, elapsed));

        match result {
            Ok(value) => {
                self.state = stage.completes();
                debug!("stage {} done in {:?}, state {:?}", stage, elapsed, self.state);
                Ok(value)
            }
            Err(source) => {
                self.state = RunState::Failed(stage);
                metrics.stage_failures.with_label_values(&[stage.as_str(), source.kind()]).inc();
                Err(StageError { stage, source })
            }
        }
    }
}

async fn read_back<S: RemoteStore>(store: &S, key: &str, cleanup: bool) -> Result<usize> {
    if !store.key_exists(key).await? {
        return Err(Error::KeyNotFound(key.to_owned()));
    }
    info!("Key '{}' exists in Redis.", key);

    let value = store.get_value(key).await?;
    if value.is_empty() {
        return Err(Error::Store {
            op: "GET",
            reason: format!("key '{}' holds an empty value", key),
        });
    }
    info!("Cached validation result retrieved successfully for key '{}'.", key);

    if cleanup {
        let removed = store.delete_key(key).await?;
        info!("cleanup of key '{}', removed: {}", key, removed);
    }
    Ok(value.len())
}
