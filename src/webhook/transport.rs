//! HTTP Transport
//!
//! One outbound GET per call. Timeouts and retries live in the sender.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Url;
use tracing::debug;

use super::normalizer::RawResponse;
use crate::error::WebhookError;

/// Prefer JSON, cope with text
pub const ACCEPT_HEADER: &str = "application/json, text/plain;q=0.9, */*;q=0.8";

/// A fully built webhook request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub url: Url,
}

impl OutboundRequest {
    /// Look up a query parameter by name
    pub fn query(&self, key: &str) -> Option<String> {
        self.url
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }
}

/// Trait for the HTTP layer underneath the retrying sender
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one GET; any HTTP status is a successful return here
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, WebhookError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, WebhookError> {
        debug!("📡 GET {}", request.url);

        let response = self
            .client
            .get(request.url.clone())
            .header(ACCEPT, ACCEPT_HEADER)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = if response.status().is_success() {
            response.text().await?
        } else {
            // Keep the status even when the error body is unreadable
            response.text().await.unwrap_or_else(|e| {
                debug!("📭 Could not read HTTP {} body: {}", status, e);
                String::new()
            })
        };

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Parse the endpoint and append `params`, keeping any query it already has
pub fn build_url(endpoint: &str, params: &[(&str, &str)]) -> Result<Url, WebhookError> {
    Url::parse_with_params(endpoint, params)
        .map_err(|e| WebhookError::Transport(format!("invalid endpoint URL '{endpoint}': {e}")))
}

/// Build the chat request for one attempt
pub fn message_request(
    endpoint: &str,
    message: &str,
    timestamp: DateTime<Utc>,
    user_id: &str,
) -> Result<OutboundRequest, WebhookError> {
    let timestamp = timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);
    let url = build_url(
        endpoint,
        &[
            ("message", message),
            ("timestamp", timestamp.as_str()),
            ("userId", user_id),
        ],
    )?;
    Ok(OutboundRequest { url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_request_params() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let req = message_request("https://hooks.example/chat", "hello & bye", ts, "neo").unwrap();

        assert_eq!(req.url.host_str(), Some("hooks.example"));
        assert_eq!(req.url.path(), "/chat");
        assert_eq!(req.query("message").as_deref(), Some("hello & bye"));
        assert_eq!(req.query("timestamp").as_deref(), Some("2024-05-01T12:30:00.000Z"));
        assert_eq!(req.query("userId").as_deref(), Some("neo"));
    }

    #[test]
    fn test_existing_query_is_kept() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let req = message_request("https://hooks.example/chat?token=abc", "hi", ts, "neo").unwrap();
        assert_eq!(req.query("token").as_deref(), Some("abc"));
        assert_eq!(req.query("message").as_deref(), Some("hi"));
    }

    #[test]
    fn test_invalid_endpoint_is_transport_error() {
        let err = build_url("not a url", &[("ping", "1")]).unwrap_err();
        assert!(matches!(err, WebhookError::Transport(_)));
        assert!(err.is_retryable());
    }
}
