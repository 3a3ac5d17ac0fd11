use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::cache::token::Token;
use crate::error::{Error, Result};
use crate::helpers::jwt::expiry_from_jwt;
use crate::sources::TokenSource;
use crate::utils::constants::{
    ENV_GCE_METADATA_HOST, METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE, METADATA_HOST_DEFAULT,
    METADATA_IDENTITY_PATH, METADATA_PROJECT_ID_PATH, METADATA_TOKEN_PATH,
};
use crate::utils::env::EnvLookup;

const METADATA_PROBE_TIMEOUT_MS: u64 = 1500;

/// Minimal client for the GCE metadata server.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    client: Client,
    /// e.g. `http://metadata.google.internal`
    root: String,
    host_overridden: bool,
}

impl MetadataClient {
    pub fn new(client: Client, host: &str) -> Self {
        Self {
            client,
            root: format!("http://{}", host.trim_end_matches('/')),
            host_overridden: false,
        }
    }

    /// `GCE_METADATA_HOST` wins over the configured host, which wins over the default.
    pub fn from_env(client: Client, env: &dyn EnvLookup, configured_host: Option<&str>) -> Self {
        match env.non_empty(ENV_GCE_METADATA_HOST) {
            Some(host) => {
                let mut metadata = Self::new(client, &host);
                metadata.host_overridden = true;
                metadata
            }
            None => {
                let mut metadata = Self::new(client, configured_host.unwrap_or(METADATA_HOST_DEFAULT));
                metadata.host_overridden = configured_host.is_some();
                metadata
            }
        }
    }

    /// Point at a full base url such as a mock server's `http://127.0.0.1:port`.
    pub fn with_root(client: Client, root: impl Into<String>) -> Self {
        Self {
            client,
            root: root.into().trim_end_matches('/').to_owned(),
            host_overridden: true,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// GET `/computeMetadata/v1/{path}` and return the body.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let url = format!("{}/computeMetadata/v1/{}", self.root, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .header(METADATA_FLAVOR_HEADER, METADATA_FLAVOR_VALUE)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Error::MetadataStatus { url, status: response.status().as_u16() });
        }
        Ok(response.text().await?)
    }

    pub async fn project_id(&self) -> Result<String> {
        let body = self.get(METADATA_PROJECT_ID_PATH, &[]).await?;
        Ok(body.trim().to_owned())
    }

    /// Whether the process runs on Google compute infrastructure.
    ///
    /// An explicitly configured host counts as yes, otherwise the server is
    /// probed and must answer with `Metadata-Flavor: Google`.
    pub async fn on_gce(&self) -> bool {
        if self.host_overridden {
            return true;
        }
        let probe = self
            .client
            .get(&self.root)
            .timeout(Duration::from_millis(METADATA_PROBE_TIMEOUT_MS))
            .send()
            .await;
        match probe {
            Ok(response) => response
                .headers()
                .get(METADATA_FLAVOR_HEADER)
                .is_some_and(|v| v == METADATA_FLAVOR_VALUE),
            Err(e) => {
                debug!("metadata server probe failed: {e}");
                false
            }
        }
    }
}

/// Identity tokens from the metadata server for the instance's default service account.
#[derive(Debug, Clone)]
pub struct MetadataIdTokenSource {
    metadata: MetadataClient,
    audience: String,
}

impl MetadataIdTokenSource {
    pub fn new(metadata: MetadataClient, audience: String) -> Self {
        Self { metadata, audience }
    }
}

#[async_trait]
impl TokenSource for MetadataIdTokenSource {
    async fn token(&self) -> Result<Token> {
        let id_token = self
            .metadata
            .get(
                METADATA_IDENTITY_PATH,
                &[("audience", self.audience.as_str()), ("format", "full")],
            )
            .await?;
        let id_token = id_token.trim().to_owned();
        let expiry = expiry_from_jwt(&id_token)?;
        Ok(Token::bearer(id_token, expiry))
    }
}

/// OAuth2 access tokens from the metadata server.
#[derive(Debug, Clone)]
pub struct MetadataAccessTokenSource {
    metadata: MetadataClient,
}

impl MetadataAccessTokenSource {
    pub fn new(metadata: MetadataClient) -> Self {
        Self { metadata }
    }
}

#[async_trait]
impl TokenSource for MetadataAccessTokenSource {
    async fn token(&self) -> Result<Token> {
        let body = self.metadata.get(METADATA_TOKEN_PATH, &[]).await?;
        Token::from_response(serde_json::from_str(&body)?)
    }
}
