use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::utils::constants::{EXPIRY_DELTA_SECONDS, TOKEN_TYPE_BEARER};

/// Token returned by a token source
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// `None` means the token never expires
    pub expiry: Option<DateTime<Utc>>,
    /// raw fields of the token endpoint response
    pub extra: Map<String, Value>,
}

impl Token {
    pub fn bearer(access_token: String, expiry: Option<DateTime<Utc>>) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_owned(),
            expiry,
            extra: Map::new(),
        }
    }

    /// Build a token from an OAuth2 token endpoint (or metadata) JSON response.
    pub fn from_response(body: Value) -> Result<Self> {
        let Value::Object(extra) = body else {
            return Err(Error::InvalidToken("token response is not a JSON object".to_owned()));
        };
        let access_token = extra
            .get("access_token")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidToken("token response has no access_token".to_owned()))?
            .to_owned();
        let token_type = extra
            .get("token_type")
            .and_then(Value::as_str)
            .unwrap_or(TOKEN_TYPE_BEARER)
            .to_owned();
        let expiry = extra
            .get("expires_in")
            .and_then(Value::as_i64)
            .filter(|secs| *secs > 0)
            .map(|secs| Utc::now() + Duration::seconds(secs));

        Ok(Self { access_token, token_type, expiry, extra })
    }

    /// Raw response field, `None` when absent
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Still usable: not expired and not within the expiry delta.
    pub fn is_valid(&self) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            None => true,
            Some(expiry) => Utc::now() + Duration::seconds(EXPIRY_DELTA_SECONDS) < expiry,
        }
    }

    pub fn authorization_value(&self) -> String {
        format!("{} {}", TOKEN_TYPE_BEARER, self.access_token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_refresh_response_and_keeps_raw_fields() {
        let token = Token::from_response(json!({
            "access_token": "ya29.abc",
            "token_type": "Bearer",
            "expires_in": 3599,
            "id_token": "eyJ.id.token",
        }))
        .unwrap();

        assert_eq!(token.access_token, "ya29.abc");
        assert_eq!(token.extra("id_token"), Some(&json!("eyJ.id.token")));
        assert!(token.expiry.unwrap() > Utc::now() + Duration::seconds(3500));
        assert!(token.is_valid());
    }

    #[test]
    fn response_without_access_token_is_rejected() {
        let err = Token::from_response(json!({"id_token": "x"})).unwrap_err();
        assert!(matches!(err, Error::InvalidToken(_)));
    }

    #[test]
    fn validity_honours_expiry_delta() {
        let no_expiry = Token::bearer("a".into(), None);
        assert!(no_expiry.is_valid());

        let almost_expired = Token::bearer("a".into(), Some(Utc::now() + Duration::seconds(5)));
        assert!(!almost_expired.is_valid());

        let empty = Token::bearer(String::new(), None);
        assert!(!empty.is_valid());
    }
}
