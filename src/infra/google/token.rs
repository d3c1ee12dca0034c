use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

fn required_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| anyhow!("{name} must be set"))
}

/// Returns an OAuth access token for the Google reporting APIs.
///
/// `GOOGLE_ACCESS_TOKEN` is used as is when present. Otherwise
/// `GOOGLE_REFRESH_TOKEN` is exchanged using `GOOGLE_CLIENT_ID` and
/// `GOOGLE_CLIENT_SECRET`.
pub async fn access_token_from_env() -> Result<String> {
    if let Ok(token) = std::env::var("GOOGLE_ACCESS_TOKEN") {
        debug!("Using GOOGLE_ACCESS_TOKEN");
        return Ok(token);
    }

    let refresh_token = required_env("GOOGLE_REFRESH_TOKEN")
        .context("Set GOOGLE_ACCESS_TOKEN or the GOOGLE_REFRESH_TOKEN credentials")?;
    let client_id = required_env("GOOGLE_CLIENT_ID")?;
    let client_secret = required_env("GOOGLE_CLIENT_SECRET")?;

    exchange_refresh_token(&refresh_token, &client_id, &client_secret).await
}

#[tracing::instrument(skip_all)]
async fn exchange_refresh_token(
    refresh_token: &str,
    client_id: &str,
    client_secret: &str,
) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .build()?;

    let response = client
        .post(TOKEN_URL)
        .form(&RefreshRequest {
            grant_type: "refresh_token",
            refresh_token,
            client_id,
            client_secret,
        })
        .send()
        .await
        .map_err(|e| anyhow!("Failed to send token request: {}", e))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(anyhow!("Token exchange failed with status {}: {}", status, body));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| anyhow!("Failed to parse token response: {}", e))?;

    info!(expires_in = token.expires_in, "Google access token obtained");
    Ok(token.access_token)
}
