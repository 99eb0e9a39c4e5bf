//! Bounded retry policy with exponential backoff

use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How many times to retry a remote operation and how long to wait in between
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff_ms: u64,
    /// Upper bound for any single delay
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A policy that retries without sleeping
    #[cfg(test)]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Attempts allowed, never less than one
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given failed attempt (1-based), doubling each time
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let millis = self
            .initial_backoff_ms
            .saturating_mul(1u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Sleep for the backoff that follows `attempt`
    pub fn wait(&self, attempt: u32) {
        let delay = self.backoff(attempt);
        if !delay.is_zero() {
            tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "backing off");
            thread::sleep(delay);
        }
    }
}
