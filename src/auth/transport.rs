use async_trait::async_trait;
use http::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request, Response};
use tracing::debug;

use crate::auth::{id_token_source, Mechanisms};
use crate::error::{Error, Result};
use crate::sources::TokenSource;

/// One request in, one response out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(&self, request: Request) -> Result<Response>;
}

#[async_trait]
impl Transport for Client {
    async fn round_trip(&self, request: Request) -> Result<Response> {
        Ok(self.execute(request).await?)
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn round_trip(&self, request: Request) -> Result<Response> {
        (**self).round_trip(request).await
    }
}

/// Transport that authorizes every request with an identity token for `audience`.
///
/// A token source is built per request, token reuse across requests is up to
/// the mechanisms handing out sources.
#[derive(Debug, Clone)]
pub struct AuthTransport<T, M> {
    transport: T,
    mechanisms: M,
    audience: String,
}

impl<T: Transport, M: Mechanisms> AuthTransport<T, M> {
    pub fn new(transport: T, mechanisms: M, audience: impl Into<String>) -> Self {
        Self {
            transport,
            mechanisms,
            audience: audience.into(),
        }
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }
}

#[async_trait]
impl<T: Transport, M: Mechanisms> Transport for AuthTransport<T, M> {
    async fn round_trip(&self, mut request: Request) -> Result<Response> {
        let source = id_token_source(&self.mechanisms, &self.audience)
            .await
            .map_err(|e| Error::CreateTokenSource(Box::new(e)))?;

        let token = source
            .token()
            .await
            .map_err(|e| Error::GetToken(Box::new(e)))?;

        let mut value = HeaderValue::from_str(&token.authorization_value())
            .map_err(|e| Error::GetToken(Box::new(e.into())))?;
        value.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, value);

        debug!("{} {} authorized for {}", request.method(), request.url(), self.audience);
        self.transport.round_trip(request).await
    }
}
