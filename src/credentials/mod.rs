//! Application Default Credentials: file formats and discovery.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::utils::constants::{CREDENTIALS_AUTHORIZED_USER, CREDENTIALS_SERVICE_ACCOUNT};

pub mod discovery;

/// `type: service_account` key file
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key_id: Option<String>,
    pub private_key: String,
    pub token_uri: Option<String>,
    pub project_id: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("private_key", &"[censored]")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

/// `type: authorized_user` file written by `gcloud auth application-default login`
#[derive(Clone, Deserialize)]
pub struct AuthorizedUser {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub token_uri: Option<String>,
    pub quota_project_id: Option<String>,
}

impl std::fmt::Debug for AuthorizedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUser")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[censored]")
            .field("refresh_token", &"[censored]")
            .field("token_uri", &self.token_uri)
            .field("quota_project_id", &self.quota_project_id)
            .finish()
    }
}

/// Parsed credentials file
#[derive(Debug, Clone)]
pub enum CredentialsFile {
    ServiceAccount(ServiceAccountKey),
    AuthorizedUser(AuthorizedUser),
    /// Recognised JSON but a type this crate does not mint tokens for
    Other(String),
}

impl CredentialsFile {
    pub fn from_json(json: Value) -> Result<Self> {
        let kind = json
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidCredentials("credentials file has no `type` field".to_owned()))?
            .to_owned();
        match kind.as_str() {
            CREDENTIALS_SERVICE_ACCOUNT => Ok(Self::ServiceAccount(serde_json::from_value(json)?)),
            CREDENTIALS_AUTHORIZED_USER => Ok(Self::AuthorizedUser(serde_json::from_value(json)?)),
            _ => Ok(Self::Other(kind)),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::ServiceAccount(_) => CREDENTIALS_SERVICE_ACCOUNT,
            Self::AuthorizedUser(_) => CREDENTIALS_AUTHORIZED_USER,
            Self::Other(kind) => kind,
        }
    }
}

/// Where default credentials come from
#[derive(Debug, Clone)]
pub enum DefaultCredentials {
    File(CredentialsFile),
    /// No file, running on Google Compute infrastructure
    Metadata,
}
