//! Project id resolution: environment first, metadata server second.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{Error, Result};
use crate::sources::metadata::MetadataClient;
use crate::utils::constants::ENV_GOOGLE_CLOUD_PROJECT;
use crate::utils::env::{EnvLookup, ProcessEnv};

/// Metadata lookup used by [`ProjectResolver`].
#[async_trait]
pub trait ProjectMetadata: Send + Sync {
    async fn project_id(&self) -> Result<String>;
}

#[async_trait]
impl ProjectMetadata for MetadataClient {
    async fn project_id(&self) -> Result<String> {
        MetadataClient::project_id(self).await
    }
}

pub struct ProjectResolver<M> {
    env: Arc<dyn EnvLookup>,
    metadata: M,
}

impl ProjectResolver<MetadataClient> {
    /// Process environment and the default metadata host.
    pub fn from_env(client: reqwest::Client) -> Self {
        let metadata = MetadataClient::from_env(client, &ProcessEnv, None);
        Self::new(Arc::new(ProcessEnv), metadata)
    }
}

impl<M: ProjectMetadata> ProjectResolver<M> {
    pub fn new(env: Arc<dyn EnvLookup>, metadata: M) -> Self {
        Self { env, metadata }
    }

    /// `GOOGLE_CLOUD_PROJECT` when set, else the metadata server's project id.
    ///
    /// Cloud Shell and App Engine export the variable, using it saves a
    /// metadata round trip. Nothing is memoized between calls.
    pub async fn project_id(&self) -> Result<String> {
        if let Some(project) = self.env.non_empty(ENV_GOOGLE_CLOUD_PROJECT) {
            debug!("project id from {ENV_GOOGLE_CLOUD_PROJECT}");
            return Ok(project);
        }

        self.metadata
            .project_id()
            .await
            .map_err(|e| Error::MetadataLookup(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockMetadata {
        answer: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl MockMetadata {
        fn new(answer: Option<&'static str>) -> Self {
            Self { answer, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl ProjectMetadata for MockMetadata {
        async fn project_id(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer
                .map(str::to_owned)
                .ok_or(Error::MetadataStatus { url: "mock".into(), status: 404 })
        }
    }

    fn env(project: &str) -> Arc<dyn EnvLookup> {
        Arc::new(HashMap::from([(ENV_GOOGLE_CLOUD_PROJECT.to_owned(), project.to_owned())]))
    }

    #[tokio::test]
    async fn environment_short_circuits_metadata() {
        let resolver = ProjectResolver::new(env("proj-123"), MockMetadata::new(Some("proj-456")));

        assert_eq!(resolver.project_id().await.unwrap(), "proj-123");
        assert_eq!(resolver.metadata.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_variable_falls_through_to_metadata() {
        let resolver = ProjectResolver::new(env(""), MockMetadata::new(Some("proj-456")));

        assert_eq!(resolver.project_id().await.unwrap(), "proj-456");
        assert_eq!(resolver.metadata.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unset_variable_uses_metadata_every_call() {
        let resolver = ProjectResolver::new(Arc::new(HashMap::<String, String>::new()), MockMetadata::new(Some("proj-456")));

        assert_eq!(resolver.project_id().await.unwrap(), "proj-456");
        assert_eq!(resolver.project_id().await.unwrap(), "proj-456");
        assert_eq!(resolver.metadata.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn metadata_failure_is_wrapped() {
        let resolver = ProjectResolver::new(Arc::new(HashMap::<String, String>::new()), MockMetadata::new(None));

        let err = resolver.project_id().await.unwrap_err();
        assert!(matches!(err, Error::MetadataLookup(_)));
        assert!(err.to_string().starts_with("project id:"));
    }
}
