//! Matrix Terminal Error Types
//!
//! Centralized error handling for the config layer and the webhook client.

use thiserror::Error;

/// Central error type for Matrix Terminal
#[derive(Error, Debug)]
pub enum MatrixError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Result type alias for Matrix Terminal operations
pub type MatrixResult<T> = Result<T, MatrixError>;

/// Failure of a single webhook attempt, or of a whole send once retries run out
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WebhookError {
    #[error("webhook URL not configured")]
    NotConfigured,

    #[error("HTTP {status}{}", fmt_body(.body))]
    HttpStatus { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("response claimed JSON but did not parse: {0}")]
    MalformedJson(String),
}

fn fmt_body(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" - {body}")
    }
}

/// Discriminant of [`WebhookError`], kept for logging and diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookErrorKind {
    NotConfigured,
    HttpStatus,
    Transport,
    MalformedJson,
}

impl WebhookError {
    /// Only a missing endpoint is fatal; everything else gets another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, WebhookError::NotConfigured)
    }

    pub fn kind(&self) -> WebhookErrorKind {
        match self {
            WebhookError::NotConfigured => WebhookErrorKind::NotConfigured,
            WebhookError::HttpStatus { .. } => WebhookErrorKind::HttpStatus,
            WebhookError::Transport(_) => WebhookErrorKind::Transport,
            WebhookError::MalformedJson(_) => WebhookErrorKind::MalformedJson,
        }
    }
}

impl From<reqwest::Error> for WebhookError {
    fn from(err: reqwest::Error) -> Self {
        WebhookError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_is_fatal() {
        assert!(!WebhookError::NotConfigured.is_retryable());
        assert!(WebhookError::Transport("timed out".into()).is_retryable());
        assert!(WebhookError::MalformedJson("eof".into()).is_retryable());
        assert!(WebhookError::HttpStatus {
            status: 502,
            body: String::new()
        }
        .is_retryable());
    }

    #[test]
    fn test_http_status_display() {
        let err = WebhookError::HttpStatus {
            status: 500,
            body: "boom".into(),
        };
        assert_eq!(err.to_string(), "HTTP 500 - boom");

        let err = WebhookError::HttpStatus {
            status: 404,
            body: String::new(),
        };
        assert_eq!(err.to_string(), "HTTP 404");
        assert_eq!(err.kind(), WebhookErrorKind::HttpStatus);
    }
}
