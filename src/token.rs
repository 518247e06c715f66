use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// The token service is a local peer with no SLA; bound the call so a
/// stuck request cannot hold a handler forever.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body returned by the token service. Every field may be absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: Option<String>,
    pub uid: Option<String>,
    pub expires_in: Option<String>,
    pub expiration_timestamp: Option<String>,
}

/// Client for the local token-issuing service.
pub struct TokenClient {
    client: reqwest::Client,
    url: String,
}

impl TokenClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Request a fresh token, presenting `api_key` in the x-api-key header.
    pub async fn fetch(&self, api_key: &str) -> Result<TokenResponse> {
        debug!("Requesting token from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .header("x-api-key", api_key)
            .send()
            .await
            .context("Failed to reach the token service")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Token service error ({}): {}", status, body);
        }

        response
            .json()
            .await
            .context("Failed to parse the token service response")
    }
}

/// Render the token reply: the token fields plus a copy-paste curl command
/// for the downstream lookup endpoint, as a fenced code block.
pub fn format_token_reply(resp: &TokenResponse, api_domain: &str) -> String {
    let token = resp.token.as_deref().unwrap_or("token not provided");
    let uid = resp.uid.as_deref().unwrap_or("uid not provided");
    let expires_in = resp.expires_in.as_deref().unwrap_or("expiry not provided");
    let expiration_timestamp = resp
        .expiration_timestamp
        .as_deref()
        .unwrap_or("expiration timestamp not provided");

    let curl = format!(
        "```bash\n\
         curl --location 'https://{api_domain}/consultar-cpf' \\\n\
         --header 'Content-Type: application/json' \\\n\
         --header 'Authorization: Bearer {token}' \\\n\
         --data '{{\"cpf\":\"00000000272\"}}'\n\
         ```"
    );

    format!(
        "*🎟️ Token:*\n`{token}`\n\n\
         *🆔 UID:* `{uid}`\n\n\
         *⏳ Expires in:* `{expires_in}`\n\n\
         *📅 Expiration timestamp:* `{expiration_timestamp}`\n\n\
         *📋 Curl command:*\n{curl}"
    )
}
