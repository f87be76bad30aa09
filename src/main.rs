//! Matrix Terminal - Webhook Chat in Your Terminal
//!
//! Reads chat lines from stdin, forwards them to the configured webhook and
//! prints the replies.

use anyhow::Result;
use clap::Parser;
use matrix_terminal::config::{self, Config};
use matrix_terminal::display::{Display, RenderOptions, Renderer};
use matrix_terminal::session::ChatSession;
use matrix_terminal::webhook::{ReqwestTransport, RetryPolicy, RetryingSender, WebhookConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Webhook URL to send messages to (saved for next time)
    #[arg(short, long)]
    webhook: Option<String>,

    /// Config file (defaults to $MATRIX_TERMINAL_CONFIG or the user config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Do not write endpoint changes back to the config file
    #[arg(long)]
    ephemeral: bool,

    /// Print bot replies at once
    #[arg(long)]
    no_typewriter: bool,

    /// Disable colours and screen clearing
    #[arg(long)]
    no_color: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool, config: &Config) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };

    // Chat owns stdout
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.clone().unwrap_or_else(config::config_path);
    let config = Config::load_from(&config_path)?;
    init_logging(args.verbose, &config)?;

    info!("🟩 Matrix Terminal v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("📁 Config: {}", config_path.display());

    let persist_to = (!args.ephemeral).then(|| config_path.clone());
    let webhook = WebhookConfig::from_config(&config, persist_to);
    if let Some(url) = &args.webhook {
        if let Err(e) = webhook.set(url) {
            warn!("⚠️ Could not save webhook URL: {}", e);
        }
    }

    let transport = Arc::new(ReqwestTransport::new());
    let sender = RetryingSender::new(
        transport,
        RetryPolicy::from_config(&config),
        config.user_id.clone(),
    );

    let options = RenderOptions {
        typewriter_delay: if args.no_typewriter {
            Duration::ZERO
        } else {
            Duration::from_millis(config.typewriter_delay_ms)
        },
        ansi: config.color && !args.no_color,
    };
    let (display, rx) = Display::channel();
    let renderer = tokio::spawn(Renderer::new(tokio::io::stdout(), options).run(rx));

    let session = ChatSession::new(webhook, sender, display)
        .with_probe_timeout(Duration::from_secs(config.probe_timeout_secs));
    session.boot();
    let probe_watcher = session.spawn_probe_watcher();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = Vec::new();
    let mut interrupted = false;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(task) = session.handle_input(&line) {
                        in_flight.push(task);
                    }
                }
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Interrupted");
                interrupted = true;
                break;
            }
        }
        in_flight.retain(|task| !task.is_finished());
    }

    // On EOF let pending replies land; on Ctrl-C drop them
    for task in in_flight {
        if interrupted {
            task.abort();
        }
        let _ = task.await;
    }
    probe_watcher.abort();
    let _ = probe_watcher.await;
    drop(session);

    renderer.await??;
    info!("👋 Matrix Terminal terminated");
    Ok(())
}
