//! Retry policy attached to each request
//!
//! Callers build a policy once (from provider configuration) and put it on
//! every request value. The client is the only place that acts on it.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    /// Stop retrying once this much time has passed since the first attempt
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_backoff_ms: 1000,
            max_backoff_ms: 30_000,
            max_elapsed: Duration::from_secs(600),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
            max_elapsed: Duration::ZERO,
        }
    }

    /// Policy used for one service, honouring the provider-level switches
    pub fn for_service(disable_auto_retries: bool, retry_duration: Duration) -> Self {
        if disable_auto_retries {
            return Self::no_retry();
        }
        Self {
            max_elapsed: retry_duration,
            ..Self::default()
        }
    }

    /// Delay before `attempt` (1-based retry number); exponential, capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt.saturating_sub(1));
        let ms = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }

    /// Whether another attempt may start after `attempts_made`, given time already spent
    pub fn allows_retry(&self, attempts_made: u32, elapsed: Duration) -> bool {
        attempts_made < self.max_attempts
            && elapsed + self.backoff(attempts_made) <= self.max_elapsed
    }

    pub fn is_retryable_status(status: u16) -> bool {
        status == 429 || (500..600).contains(&status)
    }
}
