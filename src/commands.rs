//! Chat Input Parsing
//!
//! Lines starting with `/` are commands, everything else is a chat message.

pub const HELP_TEXT: &str = "Available commands: /help, /clear, /status, /config [webhook_url]";
pub const CLEARED_TEXT: &str = "Terminal cleared. Welcome back to the Matrix.";
pub const UNKNOWN_TEXT: &str = "Unknown command. Type /help for available commands.";

/// A slash command typed into the chat input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    Status,
    /// `/config <url>`, URL trimmed with its case preserved
    Config(String),
    /// Anything else starting with `/`, as typed
    Unknown(String),
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Command(Command),
    Message(String),
}

impl Input {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            Input::Empty
        } else if line.starts_with('/') {
            Input::Command(Command::parse(line))
        } else {
            Input::Message(line.to_string())
        }
    }
}

impl Command {
    /// Parse a trimmed line that starts with `/`
    pub fn parse(line: &str) -> Self {
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match (word.to_ascii_lowercase().as_str(), rest) {
            ("/help", "") => Command::Help,
            ("/clear", "") => Command::Clear,
            ("/status", "") => Command::Status,
            ("/config", url) if !url.is_empty() => Command::Config(url.to_string()),
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Lines printed for `/status`
pub fn status_lines(endpoint: Option<&str>) -> [String; 2] {
    let status = if endpoint.is_some() {
        "Connected"
    } else {
        "Not configured"
    };
    [
        format!("System status: {status}"),
        format!("Webhook URL: {}", endpoint.unwrap_or("Not set")),
    ]
}
