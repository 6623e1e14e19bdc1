use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, SourceError};

/// Issues JSON GET requests.
///
/// Adapters and the mirror pool only talk to the network through this trait,
/// so tests can substitute a scripted implementation.
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value>;
}

/// [`HttpFetcher`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
}

impl ReqwestFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Extracts `error.message` from a Google-style error body, if present.
fn upstream_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    error
        .get("message")
        .and_then(Value::as_str)
        .or_else(|| error.as_str())
        .map(str::to_string)
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_json(&self, url: &str, query: &[(String, String)]) -> Result<Value> {
        // query values may carry the API key, only the path is logged
        debug!(url, params = query.len(), "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| SourceError::transport(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SourceError::transport(url, e))?;

        if !status.is_success() {
            return Err(SourceError::http_status(status, url, upstream_message(&body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| SourceError::malformed(format!("{url}: {e}")))
    }
}
