use async_trait::async_trait;
use reqwest::Client;

use crate::cache::token::Token;
use crate::credentials::AuthorizedUser;
use crate::error::Result;
use crate::sources::fetch::post_token_form;
use crate::sources::TokenSource;
use crate::utils::constants::{OAUTH2_TOKEN_URL, REFRESH_TOKEN_GRANT_TYPE};

/// Access tokens from a gcloud user refresh token.
///
/// Google's refresh response also carries an `id_token`, kept in `Token::extra`.
#[derive(Debug, Clone)]
pub struct UserRefreshTokenSource {
    client: Client,
    user: AuthorizedUser,
    token_uri: String,
}

impl UserRefreshTokenSource {
    pub fn new(client: Client, user: AuthorizedUser, configured_token_uri: Option<&str>) -> Self {
        let token_uri = configured_token_uri
            .or(user.token_uri.as_deref())
            .unwrap_or(OAUTH2_TOKEN_URL)
            .to_owned();
        Self { client, user, token_uri }
    }
}

#[async_trait]
impl TokenSource for UserRefreshTokenSource {
    async fn token(&self) -> Result<Token> {
        let body = post_token_form(
            &self.client,
            &self.token_uri,
            &[
                ("grant_type", REFRESH_TOKEN_GRANT_TYPE),
                ("client_id", &self.user.client_id),
                ("client_secret", &self.user.client_secret),
                ("refresh_token", &self.user.refresh_token),
            ],
        )
        .await?;
        Token::from_response(body)
    }
}
