use std::path::Path;

use anyhow::Result;
use clap::Parser;
use podinfo_token_validator::observability::metrics::get_metrics;
use podinfo_token_validator::podinfo::TokenService;
use podinfo_token_validator::store::RedisConnector;
use podinfo_token_validator::utils::constants::DEFAULT_CONFIG_PATH;
use podinfo_token_validator::utils::logging::{self, LogLevel};
use podinfo_token_validator::utils::config_loader;
use podinfo_token_validator::workflow::Workflow;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = match config_loader::run(&args.config).await {
        Ok(service_config) => service_config,
        Err(err) => {
            eprintln!("Failed to load config: {}", err);
            std::process::exit(1);
        }
    };

    // -------------------------------
    // 2. Init logging
    // -------------------------------

    logging::run(&service_config, args.log_level);
    info!(path = %args.config, "Using configuration file");

    // -------------------------------
    // 3. Run the token lifecycle check once
    // -------------------------------

    let service = TokenService::new(&service_config.podinfo)
        .inspect_err(|err| error!("failed to prepare token service client: {}", err))?;
    let mut workflow = Workflow::new(&service_config, service, RedisConnector);
    let outcome = workflow.run().await;

    // -------------------------------
    // 4. Export metrics for the textfile collector
    // -------------------------------

    if let Some(path) = &service_config.metrics.textfile_path {
        if let Err(err) = get_metrics().await.write_textfile(Path::new(path)).await {
            warn!("failed to write metrics to {}: {}", path, err);
        }
    }

    match outcome {
        Ok(report) => {
            info!(
                key = %report.key,
                token_name = %report.validation.token_name,
                expires_at = %report.validation.expires_at,
                cached_value_len = report.cached_value_len,
                "token lifecycle verified"
            );
            Ok(())
        }
        Err(err) => {
            error!(stage = %err.stage, kind = err.source.kind(), "{}", err);
            std::process::exit(1);
        }
    }
}
