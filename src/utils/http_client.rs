use std::time::Duration;

use reqwest::Client;

use crate::config::settings::SettingsConfig;
use crate::error::Result;

/// Shared HTTP client honouring the configured timeout.
pub fn build(settings: &SettingsConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(Duration::from_millis(settings.http.timeout_ms))
        .build()?)
}
