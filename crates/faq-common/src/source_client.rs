use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, warn};

#[derive(Clone, Debug)]
pub struct SourceClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl SourceClientConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            max_error_body_bytes: 8 * 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("backend returned error: status={status} body={body}")]
    Upstream { status: StatusCode, body: String },
}

/// A fetched backend document: the raw body, kept for fingerprinting, and its parse.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: String,
    pub raw: String,
    pub value: serde_json::Value,
}

/// Read-only HTTP client for the chatbot backend's JSON documents.
///
/// Requests are single-shot. A failed source is reported to the caller, which decides
/// how to degrade; nothing here retries.
#[derive(Clone)]
pub struct SourceClient {
    config: SourceClientConfig,
    http: reqwest::Client,
}

impl SourceClient {
    pub fn new(config: SourceClientConfig) -> Result<Self, SourceClientError> {
        let http = reqwest::Client::builder()
            .user_agent("faq-picker")
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &SourceClientConfig {
        &self.config
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` and parse the body as JSON. Non-2xx statuses become `Upstream`.
    pub async fn get_json(&self, path: &str) -> Result<SourceDocument, SourceClientError> {
        let url = self.url_for(path);
        debug!(url = %url, "fetching source document");

        let resp = self.http.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
            return Err(SourceClientError::Upstream { status, body });
        }

        let raw = resp.text().await?;
        let value = serde_json::from_str(&raw)?;
        Ok(SourceDocument {
            path: path.to_string(),
            raw,
            value,
        })
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read backend error body");
            "<failed to read error body>".to_string()
        }
    }
}
