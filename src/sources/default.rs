use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::auth::Mechanisms;
use crate::cache::token_cache::ReuseTokenSource;
use crate::config::settings::SettingsConfig;
use crate::credentials::discovery::find_default_credentials;
use crate::credentials::{CredentialsFile, DefaultCredentials};
use crate::error::{Error, Result};
use crate::sources::metadata::{MetadataAccessTokenSource, MetadataClient, MetadataIdTokenSource};
use crate::sources::service_account::{
    resolve_token_uri, ServiceAccountAccessTokenSource, ServiceAccountIdTokenSource,
};
use crate::sources::user_account::UserRefreshTokenSource;
use crate::sources::BoxTokenSource;
use crate::utils::env::{EnvLookup, ProcessEnv};

/// Google credential mechanisms backed by Application Default Credentials.
#[derive(Clone)]
pub struct GoogleMechanisms {
    client: Client,
    env: Arc<dyn EnvLookup>,
    metadata: MetadataClient,
    credentials_path: Option<PathBuf>,
    token_uri: Option<String>,
}

impl GoogleMechanisms {
    pub fn new(client: Client, env: Arc<dyn EnvLookup>, settings: &SettingsConfig) -> Self {
        let metadata =
            MetadataClient::from_env(client.clone(), env.as_ref(), settings.metadata.host.as_deref());
        Self {
            client,
            env,
            metadata,
            credentials_path: settings.credentials.path.clone(),
            token_uri: settings.credentials.token_uri.clone(),
        }
    }

    /// Process environment, default settings.
    pub fn from_env() -> Self {
        Self::new(Client::new(), Arc::new(ProcessEnv), &SettingsConfig::default())
    }

    pub fn with_metadata(mut self, metadata: MetadataClient) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn metadata(&self) -> &MetadataClient {
        &self.metadata
    }

    async fn discover(&self) -> Result<DefaultCredentials> {
        find_default_credentials(
            self.env.as_ref(),
            self.credentials_path.as_deref(),
            &self.metadata,
        )
        .await
    }
}

#[async_trait]
impl Mechanisms for GoogleMechanisms {
    async fn id_token_source(&self, audience: &str) -> Result<BoxTokenSource> {
        match self.discover().await? {
            DefaultCredentials::File(CredentialsFile::ServiceAccount(key)) => {
                debug!("identity tokens from service account {}", key.client_email);
                let token_uri = resolve_token_uri(&key, self.token_uri.as_deref());
                let source = ServiceAccountIdTokenSource::new(
                    self.client.clone(),
                    key,
                    token_uri,
                    audience.to_owned(),
                );
                Ok(Arc::new(ReuseTokenSource::new(source)))
            }
            DefaultCredentials::File(other) => {
                Err(Error::UnsupportedCredentials(other.kind().to_owned()))
            }
            DefaultCredentials::Metadata => {
                debug!("identity tokens from metadata server");
                let source = MetadataIdTokenSource::new(self.metadata.clone(), audience.to_owned());
                Ok(Arc::new(ReuseTokenSource::new(source)))
            }
        }
    }

    async fn default_token_source(&self) -> Result<BoxTokenSource> {
        match self.discover().await? {
            DefaultCredentials::File(CredentialsFile::AuthorizedUser(user)) => {
                debug!("default credentials from authorized user {}", user.client_id);
                let source =
                    UserRefreshTokenSource::new(self.client.clone(), user, self.token_uri.as_deref());
                Ok(Arc::new(ReuseTokenSource::new(source)))
            }
            DefaultCredentials::File(CredentialsFile::ServiceAccount(key)) => {
                let token_uri = resolve_token_uri(&key, self.token_uri.as_deref());
                let source = ServiceAccountAccessTokenSource::new(self.client.clone(), key, token_uri);
                Ok(Arc::new(ReuseTokenSource::new(source)))
            }
            DefaultCredentials::File(CredentialsFile::Other(kind)) => {
                Err(Error::UnsupportedCredentials(kind))
            }
            DefaultCredentials::Metadata => {
                let source = MetadataAccessTokenSource::new(self.metadata.clone());
                Ok(Arc::new(ReuseTokenSource::new(source)))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::settings::CredentialsConfig;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;

    fn credentials_file(body: serde_json::Value) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.to_string().as_bytes()).unwrap();
        file
    }

    fn mechanisms_for(file: &tempfile::NamedTempFile) -> GoogleMechanisms {
        let settings = SettingsConfig {
            credentials: CredentialsConfig {
                path: Some(file.path().to_path_buf()),
                token_uri: None,
            },
            ..SettingsConfig::default()
        };
        GoogleMechanisms::new(Client::new(), Arc::new(HashMap::<String, String>::new()), &settings)
    }

    #[tokio::test]
    async fn authorized_user_is_unsupported_for_identity_tokens() {
        let file = credentials_file(json!({
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "refresh",
        }));
        let mechanisms = mechanisms_for(&file);

        let err = mechanisms.id_token_source("https://svc").await.err().unwrap();
        assert!(err.is_unsupported_credentials());

        assert!(mechanisms.default_token_source().await.is_ok());
    }

    #[tokio::test]
    async fn unknown_type_is_unsupported_everywhere() {
        let file = credentials_file(json!({"type": "external_account"}));
        let mechanisms = mechanisms_for(&file);

        assert!(mechanisms.id_token_source("https://svc").await.err().unwrap().is_unsupported_credentials());
        assert!(mechanisms.default_token_source().await.err().unwrap().is_unsupported_credentials());
    }

    #[tokio::test]
    async fn service_account_key_builds_identity_source() {
        let file = credentials_file(json!({
            "type": "service_account",
            "client_email": "runner@test-project.iam.gserviceaccount.com",
            "private_key": crate::sources::service_account::test::TEST_RSA_KEY,
        }));
        assert!(mechanisms_for(&file).id_token_source("https://svc").await.is_ok());
    }
}
