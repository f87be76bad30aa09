//! Chat Session
//!
//! The single owned context of a running terminal: endpoint config, sender
//! and display handle. Commands run inline, messages get their own task.

use rand::seq::SliceRandom;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::commands::{status_lines, Command, Input, CLEARED_TEXT, HELP_TEXT, UNKNOWN_TEXT};
use crate::display::Display;
use crate::error::WebhookError;
use crate::webhook::{probe, RetryingSender, Transport, WebhookConfig};

pub const WELCOME_TEXT: &str = "Connection established. You may now communicate with the Matrix.";
pub const UNCONFIGURED_HINT: &str =
    "No webhook configured. Use /config <webhook_url> to connect.";
/// Shown while a send is in flight
pub const TRANSMITTING_TEXT: &str = "⏳ Transmitting to the Matrix...";

/// Shown instead of a reply when delivery fails for good
pub const FALLBACK_RESPONSES: [&str; 5] = [
    "The Matrix is experiencing some interference. Your message has been received.",
    "Connection to the mainframe is unstable. Please standby.",
    "Your query has been processed. The Oracle will respond when ready.",
    "The system is currently under heavy load. Please be patient.",
    "Message received. The agents are analysing your request.",
];

pub fn fallback_response() -> &'static str {
    FALLBACK_RESPONSES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_RESPONSES[0])
}

pub struct ChatSession<T: ?Sized> {
    webhook: Arc<WebhookConfig>,
    sender: Arc<RetryingSender<T>>,
    display: Display,
    probe_timeout: Duration,
    last_error: Arc<Mutex<Option<WebhookError>>>,
}

impl<T: Transport + ?Sized + 'static> ChatSession<T> {
    pub fn new(webhook: WebhookConfig, sender: RetryingSender<T>, display: Display) -> Self {
        Self {
            webhook: Arc::new(webhook),
            sender: Arc::new(sender),
            display,
            probe_timeout: Duration::from_secs(5),
            last_error: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn webhook(&self) -> &WebhookConfig {
        &self.webhook
    }

    /// Error behind the most recent fallback reply, for diagnostics
    pub fn last_error(&self) -> Option<WebhookError> {
        self.last_error.lock().ok().and_then(|guard| guard.clone())
    }

    /// Banner and greeting
    pub fn boot(&self) {
        self.display.banner();
        self.display.system(WELCOME_TEXT);
        if !self.webhook.is_configured() {
            self.display.system(UNCONFIGURED_HINT);
        }
    }

    /// Handle one line of input. Returns the send task for chat messages.
    pub fn handle_input(&self, line: &str) -> Option<JoinHandle<()>> {
        match Input::parse(line) {
            Input::Empty => None,
            Input::Command(command) => {
                self.display.user(line.trim());
                self.run_command(command);
                None
            }
            Input::Message(message) => {
                self.display.user(message.as_str());
                if self.webhook.is_configured() {
                    self.display.system(TRANSMITTING_TEXT);
                }
                Some(self.spawn_send(message))
            }
        }
    }

    fn run_command(&self, command: Command) {
        match command {
            Command::Help => self.display.system(HELP_TEXT),
            Command::Clear => {
                self.display.clear();
                self.display.system(CLEARED_TEXT);
            }
            Command::Status => {
                let endpoint = self.webhook.get();
                for line in status_lines(endpoint.as_deref()) {
                    self.display.system(line);
                }
                if let Some(err) = self.last_error() {
                    self.display.system(format!("Last delivery error: {err}"));
                }
            }
            Command::Config(url) => match self.webhook.set(&url) {
                Ok(stored) if stored.is_empty() => self.display.system(UNCONFIGURED_HINT),
                Ok(stored) => self.display.system(format!("Webhook configured: {stored}")),
                Err(e) => {
                    warn!("⚠️ Failed to persist webhook URL: {}", e);
                    self.display.system(format!(
                        "Webhook configured: {} (not saved: {e})",
                        url.trim()
                    ));
                }
            },
            Command::Unknown(raw) => {
                info!("❓ Unknown command: {}", raw);
                self.display.system(UNKNOWN_TEXT);
            }
        }
    }

    fn spawn_send(&self, message: String) -> JoinHandle<()> {
        let sender = Arc::clone(&self.sender);
        let endpoint = self.webhook.handle();
        let display = self.display.clone();
        let last_error = Arc::clone(&self.last_error);

        tokio::spawn(async move {
            match sender.send(&message, &endpoint).await {
                Ok(reply) => {
                    for fragment in reply.items {
                        display.bot(fragment.text);
                    }
                }
                Err(e) => {
                    error!("❌ Delivery failed ({:?}): {}", e.kind(), e);
                    if let Ok(mut guard) = last_error.lock() {
                        *guard = Some(e);
                    }
                    display.bot(fallback_response());
                }
            }
        })
    }

    /// Probe now if configured, then again after every endpoint change.
    ///
    /// Ends once the session (and with it the endpoint config) is dropped.
    pub fn spawn_probe_watcher(&self) -> JoinHandle<()> {
        let mut rx = self.webhook.subscribe();
        let transport = Arc::clone(self.sender.transport());
        let display = self.display.clone();
        let timeout = self.probe_timeout;

        tokio::spawn(async move {
            let mut endpoint = rx.borrow_and_update().clone();
            loop {
                if !endpoint.trim().is_empty() {
                    let status = probe(transport.as_ref(), endpoint.trim(), timeout).await;
                    info!("🔎 Webhook probe: {}", status);
                    display.system(status.message());
                }

                if rx.changed().await.is_err() {
                    break;
                }
                endpoint = rx.borrow_and_update().clone();
            }
        })
    }
}
