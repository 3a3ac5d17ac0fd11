/// Sources module
///
/// Token sources for identity tokens and default credentials, plus the
/// credential discovery that picks between them.
use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::token::Token;
use crate::error::Result;

pub mod default;
pub mod fetch;
pub mod id_token;
pub mod metadata;
pub mod service_account;
pub mod user_account;

/// Anything that can hand out the current token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<Token>;
}

pub type BoxTokenSource = Arc<dyn TokenSource>;

#[async_trait]
impl<T: TokenSource + ?Sized> TokenSource for Arc<T> {
    async fn token(&self) -> Result<Token> {
        (**self).token().await
    }
}

#[async_trait]
impl<T: TokenSource + ?Sized> TokenSource for Box<T> {
    async fn token(&self) -> Result<Token> {
        (**self).token().await
    }
}

/// Source that always returns the same token. Handy for pre-issued tokens.
#[derive(Debug, Clone)]
pub struct StaticTokenSource(pub Token);

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Result<Token> {
        Ok(self.0.clone())
    }
}
