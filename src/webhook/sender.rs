//! Retrying Sender
//!
//! Sends one logical chat message: each attempt is bounded by the policy's
//! timeout, failures back off exponentially, and the last error wins.

use chrono::Utc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio_retry::RetryIf;
use tracing::{debug, error, warn};

use super::endpoint::EndpointSource;
use super::normalizer::{normalize, NormalizedResult};
use super::policy::RetryPolicy;
use super::transport::{message_request, Transport};
use crate::error::WebhookError;

/// Longest error body carried in [`WebhookError::HttpStatus`]
pub const ERROR_BODY_SNIPPET_CHARS: usize = 200;

/// Forwards messages to the webhook with bounded exponential backoff
pub struct RetryingSender<T: ?Sized> {
    transport: Arc<T>,
    policy: RetryPolicy,
    user_id: String,
}

impl<T: Transport + ?Sized> RetryingSender<T> {
    pub fn new(transport: Arc<T>, policy: RetryPolicy, user_id: impl Into<String>) -> Self {
        Self {
            transport,
            policy,
            user_id: user_id.into(),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Send `message` and normalize the reply.
    ///
    /// The endpoint is read afresh at the start of every attempt. An unset
    /// endpoint fails with [`WebhookError::NotConfigured`] without retrying.
    pub async fn send<E>(&self, message: &str, endpoint: &E) -> Result<NormalizedResult, WebhookError>
    where
        E: EndpointSource + ?Sized,
    {
        if endpoint.current().is_none() {
            warn!("⚠️ Webhook URL not configured, message not sent");
            return Err(WebhookError::NotConfigured);
        }

        let attempts = AtomicUsize::new(0);
        let counter = &attempts;
        let this = self;

        let result = RetryIf::spawn(
            self.policy.delays(),
            move || this.attempt(message, endpoint, counter.fetch_add(1, Ordering::SeqCst)),
            |err: &WebhookError| err.is_retryable(),
        )
        .await;

        if let Err(e) = &result {
            error!(
                "❌ Webhook send failed after {} attempt(s): {}",
                attempts.load(Ordering::SeqCst),
                e
            );
        }
        result
    }

    async fn attempt<E>(
        &self,
        message: &str,
        endpoint: &E,
        index: usize,
    ) -> Result<NormalizedResult, WebhookError>
    where
        E: EndpointSource + ?Sized,
    {
        let total = self.policy.total_attempts();
        let result = self.try_once(message, endpoint).await;
        match &result {
            Ok(reply) => debug!(
                "📨 Webhook attempt {}/{} succeeded with {} fragment(s)",
                index + 1,
                total,
                reply.items.len()
            ),
            Err(e) => warn!("🔁 Webhook attempt {}/{} failed: {}", index + 1, total, e),
        }
        result
    }

    async fn try_once<E>(&self, message: &str, endpoint: &E) -> Result<NormalizedResult, WebhookError>
    where
        E: EndpointSource + ?Sized,
    {
        let url = endpoint.current().ok_or(WebhookError::NotConfigured)?;
        let request = message_request(&url, message, Utc::now(), &self.user_id)?;

        // Dropping the future on expiry cancels the in-flight request
        let response = tokio::time::timeout(self.policy.attempt_timeout, self.transport.get(&request))
            .await
            .map_err(|_| {
                WebhookError::Transport(format!(
                    "request timed out after {}ms",
                    self.policy.attempt_timeout.as_millis()
                ))
            })??;

        if !response.is_success() {
            return Err(WebhookError::HttpStatus {
                status: response.status,
                body: snippet(&response.body),
            });
        }

        normalize(&response)
    }
}

fn snippet(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(ERROR_BODY_SNIPPET_CHARS) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::normalizer::RawResponse;
    use crate::webhook::transport::OutboundRequest;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Always answers with the same reply and counts calls
    struct FixedTransport {
        reply: RawResponse,
        calls: Mutex<Vec<OutboundRequest>>,
    }

    #[async_trait]
    impl Transport for FixedTransport {
        async fn get(&self, request: &OutboundRequest) -> Result<RawResponse, WebhookError> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.reply.clone())
        }
    }

    fn fixed(status: u16, body: &str) -> Arc<FixedTransport> {
        Arc::new(FixedTransport {
            reply: RawResponse {
                status,
                content_type: Some("application/json".to_string()),
                body: body.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let long = "é".repeat(ERROR_BODY_SNIPPET_CHARS + 5);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), ERROR_BODY_SNIPPET_CHARS + 3);
        assert_eq!(snippet("  short  "), "short");
    }

    #[tokio::test]
    async fn test_not_configured_makes_no_attempt() {
        let transport = fixed(200, r#"{"text":"unused"}"#);
        let sender = RetryingSender::new(transport.clone(), RetryPolicy::default(), "neo");

        let err = sender.send("hello", "").await.unwrap_err();
        assert_eq!(err, WebhookError::NotConfigured);
        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_success_sends_query_params() {
        let transport = fixed(200, r#"{"response":"welcome"}"#);
        let sender = RetryingSender::new(transport.clone(), RetryPolicy::default(), "neo");

        let reply = sender.send("knock knock", "https://hooks.example/chat").await.unwrap();
        assert_eq!(reply.texts(), vec!["welcome"]);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query("message").as_deref(), Some("knock knock"));
        assert_eq!(calls[0].query("userId").as_deref(), Some("neo"));
        assert!(calls[0].query("timestamp").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_http_error_exhausts_budget() {
        let transport = fixed(503, "upstream down");
        let sender = RetryingSender::new(transport.clone(), RetryPolicy::default(), "neo");

        let err = sender.send("hello", "https://hooks.example/chat").await.unwrap_err();
        assert_eq!(
            err,
            WebhookError::HttpStatus {
                status: 503,
                body: "upstream down".to_string()
            }
        );
        assert_eq!(transport.calls.lock().unwrap().len(), 4);
    }
}
