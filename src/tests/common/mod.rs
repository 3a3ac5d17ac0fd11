// tests/common/mod.rs
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

use crate::config::settings::{CredentialsConfig, SettingsConfig};
use crate::sources::default::GoogleMechanisms;
use crate::sources::metadata::MetadataClient;
use crate::utils::constants::ENV_CLOUDSDK_CONFIG;
use crate::utils::env::EnvLookup;

pub fn build_reqwest_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("reqwest client")
}

/// Write a credentials JSON file that lives as long as the returned handle
pub fn credentials_file(body: Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(body.to_string().as_bytes()).expect("write credentials");
    file
}

/// Environment with an empty gcloud config dir, so no well-known file is found
pub fn isolated_env() -> (Arc<dyn EnvLookup>, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);
    (Arc::new(env), dir)
}

/// Mechanisms reading `credentials` and talking to `metadata_root` for everything else
pub fn mechanisms(credentials: Option<&NamedTempFile>, metadata_root: &str) -> (GoogleMechanisms, TempDir) {
    let (env, dir) = isolated_env();
    let settings = SettingsConfig {
        credentials: CredentialsConfig {
            path: credentials.map(|f| f.path().to_path_buf()),
            token_uri: None,
        },
        ..SettingsConfig::default()
    };
    let client = build_reqwest_client();
    let mechanisms = GoogleMechanisms::new(client.clone(), env, &settings)
        .with_metadata(MetadataClient::with_root(client, metadata_root));
    (mechanisms, dir)
}
