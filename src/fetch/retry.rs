// src/fetch/retry.rs

use reqwest::StatusCode;
use std::time::Duration;

/// Server statuses worth another attempt: gateway errors and Cloudflare's
/// origin timeout.
pub const TRANSIENT_STATUSES: [u16; 4] = [502, 503, 504, 524];

pub fn is_transient(status: StatusCode) -> bool {
    TRANSIENT_STATUSES.contains(&status.as_u16())
}

/// Longest single wait between retries.
pub const MAX_BACKOFF: Duration = Duration::from_secs(600);

/// Exponential backoff: `backoff_factor * 2^(attempt - 1)` seconds before
/// retry number `attempt`, at most `max_retries` retries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff_factor: f64,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor,
        }
    }

    /// Delay before retry `attempt` (1-based), capped at [`MAX_BACKOFF`].
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let secs = self.backoff_factor * f64::from(1u32 << exp);
        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(secs)
            .unwrap_or(MAX_BACKOFF)
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, 1.0)
    }
}
