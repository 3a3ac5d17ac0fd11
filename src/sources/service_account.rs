use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::cache::token::Token;
use crate::credentials::ServiceAccountKey;
use crate::error::{Error, Result};
use crate::helpers::jwt::expiry_from_jwt;
use crate::helpers::time::now_i64;
use crate::sources::fetch::post_token_form;
use crate::sources::TokenSource;
use crate::utils::constants::{
    ASSERTION_LIFETIME_SECONDS, CLOUD_PLATFORM_SCOPE, JWT_BEARER_GRANT_TYPE, OAUTH2_TOKEN_URL,
};

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_audience: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<&'a str>,
}

/// Sign a self-issued RS256 assertion for the JWT bearer grant.
///
/// With `target_audience` the token endpoint answers with an `id_token`,
/// with `scope` it answers with an access token.
pub fn sign_assertion(
    key: &ServiceAccountKey,
    token_uri: &str,
    target_audience: Option<&str>,
    scope: Option<&str>,
) -> Result<String> {
    let iat = now_i64();
    let claims = AssertionClaims {
        iss: &key.client_email,
        aud: token_uri,
        iat,
        exp: iat + ASSERTION_LIFETIME_SECONDS,
        target_audience,
        scope,
    };
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(jsonwebtoken::encode(&header, &claims, &encoding_key)?)
}

/// Token endpoint for a key: explicit override, then the key's own, then Google's.
pub fn resolve_token_uri(key: &ServiceAccountKey, configured: Option<&str>) -> String {
    configured
        .or(key.token_uri.as_deref())
        .unwrap_or(OAUTH2_TOKEN_URL)
        .to_owned()
}

/// Identity tokens minted from a service account key for one audience.
#[derive(Debug, Clone)]
pub struct ServiceAccountIdTokenSource {
    client: Client,
    key: ServiceAccountKey,
    token_uri: String,
    audience: String,
}

impl ServiceAccountIdTokenSource {
    pub fn new(client: Client, key: ServiceAccountKey, token_uri: String, audience: String) -> Self {
        Self { client, key, token_uri, audience }
    }
}

#[async_trait]
impl TokenSource for ServiceAccountIdTokenSource {
    async fn token(&self) -> Result<Token> {
        let assertion = sign_assertion(&self.key, &self.token_uri, Some(&self.audience), None)?;
        let body = post_token_form(
            &self.client,
            &self.token_uri,
            &[("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", &assertion)],
        )
        .await?;

        let id_token = match body.get("id_token") {
            Some(Value::String(id_token)) => id_token.to_owned(),
            _ => return Err(Error::MissingIdentityClaim),
        };
        let expiry = expiry_from_jwt(&id_token)?;
        Ok(Token::bearer(id_token, expiry))
    }
}

/// Cloud-platform scoped access tokens from a service account key.
#[derive(Debug, Clone)]
pub struct ServiceAccountAccessTokenSource {
    client: Client,
    key: ServiceAccountKey,
    token_uri: String,
}

impl ServiceAccountAccessTokenSource {
    pub fn new(client: Client, key: ServiceAccountKey, token_uri: String) -> Self {
        Self { client, key, token_uri }
    }
}

#[async_trait]
impl TokenSource for ServiceAccountAccessTokenSource {
    async fn token(&self) -> Result<Token> {
        let assertion =
            sign_assertion(&self.key, &self.token_uri, None, Some(CLOUD_PLATFORM_SCOPE))?;
        let body = post_token_form(
            &self.client,
            &self.token_uri,
            &[("grant_type", JWT_BEARER_GRANT_TYPE), ("assertion", &assertion)],
        )
        .await?;
        Token::from_response(body)
    }
}
