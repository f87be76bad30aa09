//! Webhook Endpoint Configuration
//!
//! Holds the single configured webhook URL, persists it into the config file
//! and notifies subscribers whenever it changes.

use std::path::PathBuf;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::MatrixResult;

/// Anything that can tell the sender where to send right now
pub trait EndpointSource: Send + Sync {
    /// Current endpoint, `None` when unconfigured
    fn current(&self) -> Option<String>;
}

fn non_empty(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

impl EndpointSource for str {
    fn current(&self) -> Option<String> {
        non_empty(self)
    }
}

impl EndpointSource for String {
    fn current(&self) -> Option<String> {
        non_empty(self)
    }
}

impl EndpointSource for Option<String> {
    fn current(&self) -> Option<String> {
        self.as_deref().and_then(non_empty)
    }
}

/// Live view of a [`WebhookConfig`]; every read sees the latest value
#[derive(Debug, Clone)]
pub struct EndpointWatch(watch::Receiver<String>);

impl EndpointSource for EndpointWatch {
    fn current(&self) -> Option<String> {
        non_empty(&self.0.borrow())
    }
}

/// Only URL-looking values are restored from disk
pub fn is_restorable(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// The configured webhook endpoint
#[derive(Debug)]
pub struct WebhookConfig {
    tx: watch::Sender<String>,
    path: Option<PathBuf>,
}

impl WebhookConfig {
    /// Unpersisted endpoint, starts unset
    pub fn in_memory() -> Self {
        Self::with_initial(String::new(), None)
    }

    /// Restore from the config file at `path`; later changes are written back there
    pub fn load(path: impl Into<PathBuf>) -> MatrixResult<Self> {
        let path = path.into();
        let config = Config::load_from(&path)?;
        Ok(Self::from_config(&config, Some(path)))
    }

    /// Seed from an already loaded config
    pub fn from_config(config: &Config, path: Option<PathBuf>) -> Self {
        let initial = if is_restorable(&config.webhook_url) {
            config.webhook_url.trim().to_string()
        } else {
            if !config.webhook_url.trim().is_empty() {
                warn!(
                    "⚠️ Ignoring stored webhook URL that does not look like a URL: {}",
                    config.webhook_url
                );
            }
            String::new()
        };
        Self::with_initial(initial, path)
    }

    fn with_initial(initial: String, path: Option<PathBuf>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, path }
    }

    /// Set the endpoint; an empty value clears it.
    ///
    /// The new value is live for subscribers even if persisting it fails.
    pub fn set(&self, url: &str) -> MatrixResult<String> {
        let url = url.trim().to_string();
        self.tx.send_replace(url.clone());

        if url.is_empty() {
            info!("🔌 Webhook endpoint cleared");
        } else {
            info!("🔗 Webhook endpoint set: {}", url);
        }

        if let Some(path) = &self.path {
            let mut config = Config::load_from(path)?;
            config.webhook_url = url.clone();
            config.save_to(path)?;
        }

        Ok(url)
    }

    pub fn clear(&self) -> MatrixResult<()> {
        self.set("").map(|_| ())
    }

    /// Current endpoint, `None` when unset
    pub fn get(&self) -> Option<String> {
        non_empty(&self.tx.borrow())
    }

    pub fn is_configured(&self) -> bool {
        self.get().is_some()
    }

    /// Change notifications; the value is the raw (possibly empty) endpoint
    pub fn subscribe(&self) -> watch::Receiver<String> {
        self.tx.subscribe()
    }

    /// An [`EndpointSource`] tracking this config
    pub fn handle(&self) -> EndpointWatch {
        EndpointWatch(self.subscribe())
    }
}

impl EndpointSource for WebhookConfig {
    fn current(&self) -> Option<String> {
        self.get()
    }
}
