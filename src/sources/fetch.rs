/// Shared request plumbing for OAuth2 token endpoints.
use reqwest::Client;
use serde_json::Value;

use crate::error::{Error, Result};

/// POST a form to a token endpoint and return the decoded JSON body.
pub async fn post_token_form(client: &Client, url: &str, form: &[(&str, &str)]) -> Result<Value> {
    let response = client.post(url).form(form).send().await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::TokenFetch {
            url: url.to_owned(),
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<Value>().await?)
}
