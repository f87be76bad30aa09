pub mod mock_transport;

use matrix_terminal::display::{Display, RenderOptions, Renderer};
use matrix_terminal::session::ChatSession;
use matrix_terminal::webhook::{RetryPolicy, RetryingSender, WebhookConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

#[allow(unused_imports)]
pub use mock_transport::{MockTransport, Step};

/// A session wired to a mock transport and an in-memory renderer
#[allow(dead_code)]
pub struct TestContext {
    pub session: ChatSession<MockTransport>,
    pub transport: Arc<MockTransport>,
    renderer: JoinHandle<std::io::Result<Vec<u8>>>,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new(transport: MockTransport) -> Self {
        Self::with_webhook(transport, WebhookConfig::in_memory())
    }

    pub fn with_webhook(transport: MockTransport, webhook: WebhookConfig) -> Self {
        let transport = Arc::new(transport);
        let sender = RetryingSender::new(
            Arc::clone(&transport),
            RetryPolicy::default(),
            "matrix-terminal-user",
        );

        let (display, rx) = Display::channel();
        let options = RenderOptions {
            typewriter_delay: Duration::ZERO,
            ansi: false,
        };
        let renderer = tokio::spawn(Renderer::new(Vec::new(), options).run(rx));

        Self {
            session: ChatSession::new(webhook, sender, display),
            transport,
            renderer,
        }
    }

    /// Drop the session and collect everything rendered
    pub async fn finish(self) -> String {
        drop(self.session);
        let out = self
            .renderer
            .await
            .expect("renderer panicked")
            .expect("renderer failed");
        String::from_utf8(out).expect("renderer wrote invalid UTF-8")
    }
}
