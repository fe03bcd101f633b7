use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Workflow stages
    pub stage_attempts: IntCounterVec,
    pub stage_failures: IntCounterVec,
    pub stage_duration: HistogramVec,

    // Run outcome
    pub last_run_success: IntGauge,
    pub last_run_timestamp: IntGauge,

    // Config
    pub config_errors: IntCounter,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenvalidator".into()), None).expect("metrics registry");

        let metrics: Arc<Metrics> = Arc::new(Self {
            stage_attempts: IntCounterVec::new(Opts::new("stage_attempts_total", "Workflow stage attempts"), &["stage"]).expect("stage_attempts_total"),
            stage_failures: IntCounterVec::new(Opts::new("stage_failures_total", "Workflow stage failures by error kind"), &["stage", "reason"]).expect("stage_failures_total"),
            stage_duration: HistogramVec::new(HistogramOpts::new("stage_duration_seconds", "Workflow stage duration seconds").buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["stage"]).expect("stage_duration_seconds"),

            last_run_success: IntGauge::new("last_run_success", "1 if the last run reached Verified").expect("last_run_success"),
            last_run_timestamp: IntGauge::new("last_run_timestamp_seconds", "Finish time of the last run (UNIX seconds)").expect("last_run_timestamp_seconds"),

            config_errors: IntCounter::new("config_errors_total", "Configuration load and validation errors").expect("config_errors_total"),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.stage_attempts.clone())).expect("register stage_attempts");
        reg.register(Box::new(metrics.stage_failures.clone())).expect("register stage_failures");
        reg.register(Box::new(metrics.stage_duration.clone())).expect("register stage_duration");
        reg.register(Box::new(metrics.last_run_success.clone())).expect("register last_run_success");
        reg.register(Box::new(metrics.last_run_timestamp.clone())).expect("register last_run_timestamp");
        reg.register(Box::new(metrics.config_errors.clone())).expect("register config_errors");

        metrics
    }

    /// Text exposition format of the whole registry.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    /// Write the registry for a textfile collector. The file is replaced
    /// atomically so a scrape never sees a partial write.
    pub async fn write_textfile(&self, path: &Path) -> Result<()> {
        let tmp = path.with_extension("prom.tmp");
        tokio::fs::write(&tmp, self.render()?).await?;
        tokio::fs::rename(&tmp, path).await?;
        info!("metrics written to {}", path.display());
        Ok(())
    }
}
