use std::time::Duration;

use crate::config::Config;

/// Bounded exponential backoff around a single webhook call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one
    pub max_retries: usize,
    pub base_delay: Duration,
    /// Per-attempt deadline; expiry cancels the in-flight request
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_retry_delay_ms),
            attempt_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    pub fn total_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Delay before retry `n` (0-based): `base_delay * 2^n`, no jitter
    pub fn delay_for(&self, retry: usize) -> Duration {
        let factor = u32::try_from(retry)
            .ok()
            .and_then(|r| 1u32.checked_shl(r))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Backoff schedule, one entry per retry
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let policy = *self;
        (0..policy.max_retries).map(move |n| policy.delay_for(n))
    }
}
