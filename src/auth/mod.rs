//! Identity token sources with a fallback to default credentials.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::token_cache::ReuseTokenSource;
use crate::error::{Error, Result};
use crate::sources::id_token::IdTokenAdapter;
use crate::sources::BoxTokenSource;

pub mod transport;

/// The two ways of getting a token source that [`id_token_source`] chooses between.
#[async_trait]
pub trait Mechanisms: Send + Sync {
    /// Identity token source for `audience`.
    ///
    /// Fails with [`Error::UnsupportedCredentials`] when the available
    /// credentials cannot mint identity tokens directly.
    async fn id_token_source(&self, audience: &str) -> Result<BoxTokenSource>;

    /// OAuth2 token source from default credentials, not tied to an audience.
    async fn default_token_source(&self) -> Result<BoxTokenSource>;
}

#[async_trait]
impl<M: Mechanisms + ?Sized> Mechanisms for Arc<M> {
    async fn id_token_source(&self, audience: &str) -> Result<BoxTokenSource> {
        (**self).id_token_source(audience).await
    }

    async fn default_token_source(&self) -> Result<BoxTokenSource> {
        (**self).default_token_source().await
    }
}

/// Token source handing out identity tokens for `audience`.
///
/// Service-account style credentials are used directly. Credentials that
/// cannot mint identity tokens (user credentials from gcloud) fall back to
/// default credentials, taking the `id_token` out of each OAuth2 response.
/// Any other failure is returned as is.
pub async fn id_token_source<M: Mechanisms + ?Sized>(
    mechanisms: &M,
    audience: &str,
) -> Result<BoxTokenSource> {
    match mechanisms.id_token_source(audience).await {
        Ok(source) => Ok(source),
        Err(e) if e.is_unsupported_credentials() => {
            warn!("{e}, falling back to default credentials");
            let default_source = mechanisms
                .default_token_source()
                .await
                .map_err(|e| Error::credential_construction("default credentials", e))?;
            debug!("serving id_token from default credentials for {audience}");
            Ok(Arc::new(ReuseTokenSource::new(IdTokenAdapter::new(default_source))))
        }
        Err(e) => Err(e),
    }
}
