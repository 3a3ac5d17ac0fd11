use std::path::Path;

use anyhow::{anyhow, Result};
use tracing::debug;

use crate::config::proc_loader::file_to_config;
use crate::config::settings::ServiceConfig;

/// Load the config file, or defaults when it does not exist.
pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!("config file {config_path} not found, using defaults");
        return Ok(ServiceConfig::default());
    }
    file_to_config(path)
        .await
        .map_err(|e| anyhow!(format!("Invalid config format: {}", e)))
}
