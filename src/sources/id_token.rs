use async_trait::async_trait;
use serde_json::Value;

use crate::cache::token::Token;
use crate::error::{Error, Result};
use crate::sources::TokenSource;

/// Wraps an OAuth2 token source and hands out the `id_token` from its
/// responses as the bearer token.
#[derive(Debug)]
pub struct IdTokenAdapter<S> {
    inner: S,
}

impl<S: TokenSource> IdTokenAdapter<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: TokenSource> TokenSource for IdTokenAdapter<S> {
    async fn token(&self) -> Result<Token> {
        let token = self.inner.token().await?;

        let id_token = match token.extra("id_token") {
            Some(Value::String(id_token)) => id_token.to_owned(),
            _ => return Err(Error::MissingIdentityClaim),
        };

        Ok(Token::bearer(id_token, token.expiry))
    }
}
