//! HTTP ingestion client
//!
//! One JSON POST per log object to `{endpoint}/inputs/{token}`. The call
//! is synchronous from the caller's perspective: it resolves only once
//! the endpoint has answered (or the request failed).

use crate::error::ForwarderError;
use crate::forward::IngestClient;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Hosted ingestion endpoint, used when the config has no override.
pub const DEFAULT_ENDPOINT: &str = "https://logs-01.loggly.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the log-ingestion API
pub struct HttpIngestClient {
    http: reqwest::Client,
    // full push URL; contains the access token, so it is never logged
    url: String,
}

impl HttpIngestClient {
    pub fn new(endpoint: &str, token: &str) -> Result<Self, ForwarderError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                ForwarderError::Config(format!("failed to build ingestion HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            url: format!("{}/inputs/{}", endpoint.trim_end_matches('/'), token),
        })
    }
}

#[async_trait]
impl IngestClient for HttpIngestClient {
    async fn push(&self, payload: &Value) -> Result<(), ForwarderError> {
        let response = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .await
            .map_err(ForwarderError::IngestTransport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ForwarderError::IngestRejected {
                status: status.as_u16(),
            });
        }

        debug!(status = status.as_u16(), "ingestion push accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_url_embeds_endpoint_and_token() {
        let client = HttpIngestClient::new("https://intake.example.com", "tok-123").unwrap();
        assert_eq!(client.url, "https://intake.example.com/inputs/tok-123");
    }

    #[test]
    fn trailing_slash_on_endpoint_is_normalized() {
        let client = HttpIngestClient::new("https://intake.example.com/", "tok-123").unwrap();
        assert_eq!(client.url, "https://intake.example.com/inputs/tok-123");
    }

    #[test]
    fn default_endpoint_is_https() {
        assert!(DEFAULT_ENDPOINT.starts_with("https://"));
    }
}
