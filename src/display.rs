//! Terminal Display
//!
//! All output goes through one renderer task fed by an unbounded channel, so
//! replies from concurrent sends never interleave mid-line.

use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

const RESET: &str = "\x1b[0m";
const DIM_GREEN: &str = "\x1b[2;32m";
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

const BANNER: &str = r"
███╗   ███╗ █████╗ ████████╗██████╗ ██╗██╗  ██╗
████╗ ████║██╔══██╗╚══██╔══╝██╔══██╗██║╚██╗██╔╝
██╔████╔██║███████║   ██║   ██████╔╝██║ ╚███╔╝
██║╚██╔╝██║██╔══██║   ██║   ██╔══██╗██║ ██╔██╗
██║ ╚═╝ ██║██║  ██║   ██║   ██║  ██║██║██╔╝ ██╗
╚═╝     ╚═╝╚═╝  ╚═╝   ╚═╝   ╚═╝  ╚═╝╚═╝╚═╝  ╚═╝
";

/// Who a chat line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    System,
    User,
    Bot,
}

impl MessageKind {
    pub fn label(&self) -> &'static str {
        match self {
            MessageKind::System => "SYSTEM",
            MessageKind::User => "USER",
            MessageKind::Bot => "MATRIX",
        }
    }

    fn color(&self) -> &'static str {
        match self {
            MessageKind::System => "\x1b[36m",
            MessageKind::User => "\x1b[37m",
            MessageKind::Bot => "\x1b[92m",
        }
    }
}

/// A single rendered line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub kind: MessageKind,
    pub text: String,
    /// `HH:MM:SS`, local time
    pub timestamp: String,
}

impl ChatLine {
    pub fn now(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    Message(ChatLine),
    Clear,
    Banner,
}

/// Cloneable handle for queueing output
#[derive(Debug, Clone)]
pub struct Display {
    tx: mpsc::UnboundedSender<DisplayEvent>,
}

impl Display {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DisplayEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: DisplayEvent) {
        // Renderer gone means we are shutting down
        let _ = self.tx.send(event);
    }

    pub fn system(&self, text: impl Into<String>) {
        self.emit(DisplayEvent::Message(ChatLine::now(MessageKind::System, text)));
    }

    pub fn user(&self, text: impl Into<String>) {
        self.emit(DisplayEvent::Message(ChatLine::now(MessageKind::User, text)));
    }

    pub fn bot(&self, text: impl Into<String>) {
        self.emit(DisplayEvent::Message(ChatLine::now(MessageKind::Bot, text)));
    }

    pub fn clear(&self) {
        self.emit(DisplayEvent::Clear);
    }

    pub fn banner(&self) {
        self.emit(DisplayEvent::Banner);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    /// Per-character delay for bot lines; zero prints them at once
    pub typewriter_delay: Duration,
    /// Colours and screen clearing
    pub ansi: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            typewriter_delay: Duration::from_millis(30),
            ansi: true,
        }
    }
}

/// Drains display events into a writer
pub struct Renderer<W> {
    out: W,
    options: RenderOptions,
}

impl<W: AsyncWrite + Unpin> Renderer<W> {
    pub fn new(out: W, options: RenderOptions) -> Self {
        Self { out, options }
    }

    /// Render until every [`Display`] handle is dropped, then hand the writer back
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DisplayEvent>) -> std::io::Result<W> {
        while let Some(event) = rx.recv().await {
            self.render(&event).await?;
        }
        self.out.flush().await?;
        Ok(self.out)
    }

    pub async fn render(&mut self, event: &DisplayEvent) -> std::io::Result<()> {
        match event {
            DisplayEvent::Message(line) => self.render_line(line).await?,
            DisplayEvent::Clear => {
                if self.options.ansi {
                    self.out.write_all(CLEAR_SCREEN.as_bytes()).await?;
                }
            }
            DisplayEvent::Banner => {
                let banner = if self.options.ansi {
                    format!("{}{BANNER}{RESET}\n", MessageKind::Bot.color())
                } else {
                    format!("{BANNER}\n")
                };
                self.out.write_all(banner.as_bytes()).await?;
            }
        }
        self.out.flush().await
    }

    async fn render_line(&mut self, line: &ChatLine) -> std::io::Result<()> {
        let prefix = if self.options.ansi {
            format!(
                "{DIM_GREEN}[{}]{RESET} {}{}{RESET} {}",
                line.timestamp,
                MessageKind::Bot.color(),
                line.kind.label(),
                line.kind.color()
            )
        } else {
            format!("[{}] {} ", line.timestamp, line.kind.label())
        };
        self.out.write_all(prefix.as_bytes()).await?;

        let delay = self.options.typewriter_delay;
        if line.kind == MessageKind::Bot && !delay.is_zero() {
            let mut buf = [0u8; 4];
            for ch in line.text.chars() {
                self.out.write_all(ch.encode_utf8(&mut buf).as_bytes()).await?;
                self.out.flush().await?;
                tokio::time::sleep(delay).await;
            }
        } else {
            self.out.write_all(line.text.as_bytes()).await?;
        }

        if self.options.ansi {
            self.out.write_all(RESET.as_bytes()).await?;
        }
        self.out.write_all(b"\n").await
    }
}
