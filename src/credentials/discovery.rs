use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::credentials::{CredentialsFile, DefaultCredentials};
use crate::error::{Error, Result};
use crate::sources::metadata::MetadataClient;
use crate::utils::constants::{ENV_CLOUDSDK_CONFIG, ENV_GOOGLE_APPLICATION_CREDENTIALS};
use crate::utils::env::EnvLookup;

const WELL_KNOWN_FILE: &str = "application_default_credentials.json";

/// Locate Application Default Credentials.
///
/// Order: explicit path, `GOOGLE_APPLICATION_CREDENTIALS`, the gcloud well-known
/// file, then the metadata server. An explicit path or env var pointing at an
/// unreadable file is an error, it does not fall through.
pub async fn find_default_credentials(
    env: &dyn EnvLookup,
    explicit_path: Option<&Path>,
    metadata: &MetadataClient,
) -> Result<DefaultCredentials> {
    if let Some(path) = explicit_path {
        debug!("using credentials file from configuration: {}", path.display());
        return read_credentials_file(path).await.map(DefaultCredentials::File);
    }

    if let Some(path) = env.non_empty(ENV_GOOGLE_APPLICATION_CREDENTIALS) {
        debug!("using credentials file from {ENV_GOOGLE_APPLICATION_CREDENTIALS}: {path}");
        return read_credentials_file(Path::new(&path))
            .await
            .map(DefaultCredentials::File);
    }

    if let Some(path) = well_known_file(env) {
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            debug!("using gcloud credentials file: {}", path.display());
            return read_credentials_file(&path).await.map(DefaultCredentials::File);
        }
    }

    if metadata.on_gce().await {
        debug!("using metadata server at {}", metadata.root());
        return Ok(DefaultCredentials::Metadata);
    }

    Err(Error::CredentialsNotFound(
        "no credentials file and not running on Google Cloud".to_owned(),
    ))
}

/// gcloud's `application_default_credentials.json` location
pub fn well_known_file(env: &dyn EnvLookup) -> Option<PathBuf> {
    if let Some(dir) = env.non_empty(ENV_CLOUDSDK_CONFIG) {
        return Some(PathBuf::from(dir).join(WELL_KNOWN_FILE));
    }
    if cfg!(windows) {
        env.non_empty("APPDATA")
            .map(|dir| PathBuf::from(dir).join("gcloud").join(WELL_KNOWN_FILE))
    } else {
        env.non_empty("HOME").map(|dir| {
            PathBuf::from(dir)
                .join(".config")
                .join("gcloud")
                .join(WELL_KNOWN_FILE)
        })
    }
}

pub async fn read_credentials_file(path: &Path) -> Result<CredentialsFile> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        Error::InvalidCredentials(format!("cannot read {}: {e}", path.display()))
    })?;
    let json: Value = serde_json::from_str(&content)?;
    CredentialsFile::from_json(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use reqwest::Client;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Write;

    fn user_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let body = json!({
            "type": "authorized_user",
            "client_id": "id",
            "client_secret": "secret",
            "refresh_token": "refresh",
        });
        file.write_all(body.to_string().as_bytes()).unwrap();
        file
    }

    fn external_account_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(json!({"type": "external_account"}).to_string().as_bytes())
            .unwrap();
        file
    }

    fn unreachable_metadata() -> MetadataClient {
        // nothing listens on port 9 locally, the probe fails fast
        MetadataClient::new(Client::new(), "127.0.0.1:9")
    }

    #[tokio::test]
    async fn env_var_points_at_credentials_file() {
        let file = user_file();
        let env = HashMap::from([(
            ENV_GOOGLE_APPLICATION_CREDENTIALS.to_owned(),
            file.path().display().to_string(),
        )]);

        let found = find_default_credentials(&env, None, &unreachable_metadata()).await.unwrap();
        assert!(matches!(found, DefaultCredentials::File(CredentialsFile::AuthorizedUser(_))));
    }

    #[tokio::test]
    async fn configured_path_wins_over_env_var() {
        let configured = user_file();
        let from_env = external_account_file();
        let env = HashMap::from([(
            ENV_GOOGLE_APPLICATION_CREDENTIALS.to_owned(),
            from_env.path().display().to_string(),
        )]);

        let found = find_default_credentials(&env, Some(configured.path()), &unreachable_metadata())
            .await
            .unwrap();
        assert!(matches!(found, DefaultCredentials::File(CredentialsFile::AuthorizedUser(_))));
    }

    #[tokio::test]
    async fn env_var_wins_over_well_known_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(external_account_file().path(), dir.path().join(WELL_KNOWN_FILE)).unwrap();
        let from_env = user_file();
        let env = HashMap::from([
            (ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string()),
            (
                ENV_GOOGLE_APPLICATION_CREDENTIALS.to_owned(),
                from_env.path().display().to_string(),
            ),
        ]);

        let found = find_default_credentials(&env, None, &unreachable_metadata()).await.unwrap();
        assert!(matches!(found, DefaultCredentials::File(CredentialsFile::AuthorizedUser(_))));
    }

    #[tokio::test]
    async fn well_known_file_wins_over_metadata_server() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(external_account_file().path(), dir.path().join(WELL_KNOWN_FILE)).unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);
        let metadata = MetadataClient::with_root(Client::new(), "http://127.0.0.1:9");

        let found = find_default_credentials(&env, None, &metadata).await.unwrap();
        match found {
            DefaultCredentials::File(file) => assert_eq!(file.kind(), "external_account"),
            DefaultCredentials::Metadata => panic!("metadata server chosen over gcloud file"),
        }
    }

    #[tokio::test]
    async fn metadata_server_without_flavor_header_is_not_gce() {
        let server = MockServer::start_async().await;
        let root = server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).body("not a metadata server");
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);
        let metadata = MetadataClient::new(Client::new(), &server.address().to_string());

        let err = find_default_credentials(&env, None, &metadata).await.unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound(_)));
        root.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn metadata_server_with_flavor_header_is_used() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/");
                then.status(200).header("Metadata-Flavor", "Google");
            })
            .await;
        let dir = tempfile::tempdir().unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);
        let metadata = MetadataClient::new(Client::new(), &server.address().to_string());

        let found = find_default_credentials(&env, None, &metadata).await.unwrap();
        assert!(matches!(found, DefaultCredentials::Metadata));
    }

    #[tokio::test]
    async fn missing_env_file_does_not_fall_through() {
        let env = HashMap::from([(
            ENV_GOOGLE_APPLICATION_CREDENTIALS.to_owned(),
            "/definitely/not/here.json".to_owned(),
        )]);
        let err = find_default_credentials(&env, None, &unreachable_metadata()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials(_)));
    }

    #[tokio::test]
    async fn gcloud_well_known_file_is_used() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(user_file().path(), dir.path().join(WELL_KNOWN_FILE)).unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);

        let found = find_default_credentials(&env, None, &unreachable_metadata()).await.unwrap();
        assert!(matches!(found, DefaultCredentials::File(_)));
    }

    #[tokio::test]
    async fn overridden_metadata_host_counts_as_gce() {
        let dir = tempfile::tempdir().unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);
        let metadata = MetadataClient::with_root(Client::new(), "http://127.0.0.1:9");

        let found = find_default_credentials(&env, None, &metadata).await.unwrap();
        assert!(matches!(found, DefaultCredentials::Metadata));
    }

    #[tokio::test]
    async fn nothing_found_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = HashMap::from([(ENV_CLOUDSDK_CONFIG.to_owned(), dir.path().display().to_string())]);

        let err = find_default_credentials(&env, None, &unreachable_metadata()).await.unwrap_err();
        assert!(matches!(err, Error::CredentialsNotFound(_)));
    }
}
