use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::token::Token;
use crate::error::Result;
use crate::sources::TokenSource;

/// Single-slot cache in front of another token source.
///
/// Returns the held token while it is valid, otherwise fetches a new one from
/// the wrapped source and keeps it. The lock is held across the fetch so
/// concurrent callers wait for one refresh instead of issuing their own.
#[derive(Debug)]
pub struct ReuseTokenSource<S> {
    inner: S,
    slot: Mutex<Option<Token>>,
}

impl<S: TokenSource> ReuseTokenSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, slot: Mutex::new(None) }
    }

    /// Seed the slot with an already known token
    pub fn with_token(inner: S, token: Option<Token>) -> Self {
        Self { inner, slot: Mutex::new(token) }
    }
}

#[async_trait]
impl<S: TokenSource> TokenSource for ReuseTokenSource<S> {
    async fn token(&self) -> Result<Token> {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.clone());
        }
        debug!("cached token missing or expired, refreshing");
        let token = self.inner.token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }
}
