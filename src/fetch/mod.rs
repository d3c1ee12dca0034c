//! HTTP plumbing shared by the reporting API clients.

mod basic;
pub mod auth;

pub use basic::BasicClient;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Request, Response};
use serde::Serialize;
use tracing::debug;

/// Sends a prepared request. Auth wrappers such as [`auth::ApiKey`] decorate
/// an inner client and add their headers before delegating.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}

/// POSTs `body` as JSON and returns the parsed JSON response.
///
/// Non-success statuses become errors carrying the response body, which is
/// where the Google APIs put their diagnostics.
pub async fn post_json<C: HttpClient>(
    client: &C,
    url: reqwest::Url,
    body: &impl Serialize,
) -> Result<serde_json::Value> {
    let mut req = Request::new(reqwest::Method::POST, url);
    req.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    *req.body_mut() = Some(serde_json::to_vec(body)?.into());

    debug!(url = %req.url(), "POST");
    let resp = client.execute(req).await?;

    let status = resp.status();
    if !status.is_success() {
        let text = resp.text().await.unwrap_or_default();
        return Err(anyhow!("API returned status {}: {}", status, text));
    }

    Ok(resp.json().await?)
}
