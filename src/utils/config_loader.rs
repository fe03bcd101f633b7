use std::path::Path;

use crate::config::proc_loader::file_to_config;
use crate::config::service::ServiceConfig;
use crate::error::Result;

pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    file_to_config(Path::new(config_path)).await
}
