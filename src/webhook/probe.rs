//! Connectivity Probe
//!
//! Advisory only: the result is shown to the user and never affects sending.

use std::fmt;
use std::time::Duration;
use tracing::debug;

use super::transport::{build_url, OutboundRequest, Transport};

/// Outcome of a probe against the webhook endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    /// Answered 2xx
    Online,
    /// Answered, but not 2xx
    Limited,
    /// No answer (network error, timeout, unusable URL)
    Offline,
}

impl ProbeStatus {
    /// System line shown to the user
    pub fn message(&self) -> &'static str {
        match self {
            ProbeStatus::Online => "🟢 Webhook connection: ONLINE",
            ProbeStatus::Limited => {
                "🟡 Webhook connection: LIMITED (will use fallback responses)"
            }
            ProbeStatus::Offline => {
                "🔴 Webhook connection: OFFLINE (will use fallback responses)"
            }
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ProbeStatus::Online => "online",
            ProbeStatus::Limited => "limited",
            ProbeStatus::Offline => "offline",
        };
        f.write_str(label)
    }
}

/// GET `<endpoint>?ping=1` within `timeout`
pub async fn probe<T>(transport: &T, endpoint: &str, timeout: Duration) -> ProbeStatus
where
    T: Transport + ?Sized,
{
    let url = match build_url(endpoint, &[("ping", "1")]) {
        Ok(url) => url,
        Err(e) => {
            debug!("🔎 Probe skipped: {}", e);
            return ProbeStatus::Offline;
        }
    };
    let request = OutboundRequest { url };

    let status = match tokio::time::timeout(timeout, transport.get(&request)).await {
        Ok(Ok(response)) if response.is_success() => ProbeStatus::Online,
        Ok(Ok(response)) => {
            debug!("🔎 Probe got HTTP {}", response.status);
            ProbeStatus::Limited
        }
        Ok(Err(e)) => {
            debug!("🔎 Probe failed: {}", e);
            ProbeStatus::Offline
        }
        Err(_) => {
            debug!("🔎 Probe timed out after {:?}", timeout);
            ProbeStatus::Offline
        }
    };
    debug!("🔎 Probe {} -> {}", endpoint, status);
    status
}
