use crate::error::MatrixResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_ENV: &str = "MATRIX_TERMINAL_CONFIG";

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Webhook
    pub webhook_url: String,
    pub user_id: String,

    // Transport
    pub request_timeout_secs: u64,
    pub probe_timeout_secs: u64,
    pub max_retries: usize,
    pub base_retry_delay_ms: u64,

    // Display
    pub typewriter_delay_ms: u64,
    pub color: bool,

    // Meta
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            user_id: "matrix-terminal-user".to_string(),
            request_timeout_secs: 10,
            probe_timeout_secs: 5,
            max_retries: 3,
            base_retry_delay_ms: 1000,
            typewriter_delay_ms: 30,
            color: true,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load config from `path`; a missing file yields defaults
    pub fn load_from(path: &Path) -> MatrixResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        match serde_json::from_str(&content) {
            Ok(config) => Ok(config),
            Err(e) => {
                // Graceful degradation: keep the broken file around and carry on
                tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                let backup_path = path.with_extension("json.corrupt");
                let _ = std::fs::rename(path, &backup_path);
                Ok(Self::default())
            }
        }
    }

    /// Save config to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> MatrixResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("matrix-terminal")
        .join("config.json")
}
