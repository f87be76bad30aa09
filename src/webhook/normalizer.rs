//! Response Normalization
//!
//! Webhook backends answer in whatever shape they like: JSON arrays of
//! `{text}` objects, objects keyed by `response` or `text`, arbitrary JSON,
//! or plain text. Everything is folded into an ordered list of fragments.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::WebhookError;

/// Shown when the webhook answers 2xx with an empty body
pub const EMPTY_REPLY_ACK: &str = "✔️ Received (no content returned).";

/// A raw HTTP reply, already known to carry a 2xx status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One unit of bot output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyFragment {
    pub text: String,
}

impl ReplyFragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Ordered reply fragments; never empty once produced by [`normalize`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    pub items: Vec<ReplyFragment>,
}

impl NormalizedResult {
    fn single(text: impl Into<String>) -> Self {
        Self {
            items: vec![ReplyFragment::new(text)],
        }
    }

    /// Fragment texts in order
    pub fn texts(&self) -> Vec<&str> {
        self.items.iter().map(|f| f.text.as_str()).collect()
    }
}

/// Normalize a successful webhook reply
pub fn normalize(response: &RawResponse) -> Result<NormalizedResult, WebhookError> {
    normalize_parts(
        response.status,
        response.content_type.as_deref(),
        &response.body,
    )
}

/// Normalize from the individual reply parts
///
/// A declared JSON content type must be honoured: a body that does not parse
/// is [`WebhookError::MalformedJson`]. Without one, JSON is attempted on a
/// best-effort basis and anything unparseable is returned verbatim.
pub fn normalize_parts(
    status: u16,
    content_type: Option<&str>,
    body: &str,
) -> Result<NormalizedResult, WebhookError> {
    debug!(
        "🧾 Normalizing reply: status={} content_type={:?} bytes={}",
        status,
        content_type,
        body.len()
    );

    if declares_json(content_type) {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| WebhookError::MalformedJson(e.to_string()))?;
        return Ok(from_value(value));
    }

    if body.trim().is_empty() {
        return Ok(NormalizedResult::single(EMPTY_REPLY_ACK));
    }

    match serde_json::from_str::<Value>(body) {
        Ok(value) => Ok(from_value(value)),
        Err(_) => Ok(NormalizedResult::single(body)),
    }
}

fn declares_json(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

fn from_value(value: Value) -> NormalizedResult {
    if let Some(items) = text_items(&value) {
        return NormalizedResult { items };
    }

    if let Some(text) = value.get("response").and_then(Value::as_str) {
        return NormalizedResult::single(text);
    }

    if let Some(text) = value.get("text").and_then(Value::as_str) {
        return NormalizedResult::single(text);
    }

    // Unknown shape: show it rather than drop it
    NormalizedResult::single(value.to_string())
}

/// `[{"text": ..}, ..]` with every element carrying a string `text`
fn text_items(value: &Value) -> Option<Vec<ReplyFragment>> {
    let array = value.as_array().filter(|a| !a.is_empty())?;
    array
        .iter()
        .map(|item| {
            item.get("text")
                .and_then(Value::as_str)
                .map(ReplyFragment::new)
        })
        .collect()
}
