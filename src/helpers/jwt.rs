use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::helpers::time::from_unix;

#[derive(Debug, Deserialize)]
struct ExpClaim {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// The token comes straight from the issuer over TLS, the value is only used
/// to decide when to fetch a new one.
pub fn expiry_from_jwt(token: &str) -> Result<Option<DateTime<Utc>>> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_)) => payload,
        _ => return Err(Error::InvalidToken("identity token is not a JWT".to_owned())),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::InvalidToken(format!("identity token payload: {e}")))?;
    let claims: ExpClaim = serde_json::from_slice(&bytes)?;
    Ok(claims.exp.and_then(from_unix))
}

#[cfg(test)]
pub(crate) fn unsigned_jwt(claims: serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
