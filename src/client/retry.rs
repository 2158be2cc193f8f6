//! Bounded exponential-backoff retry.
//!
//! Delay for attempt `n` is `min(base_delay * 2^n, max_delay)`; no jitter
//! is applied. Non-retryable errors abort the loop immediately.

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use super::error::ClientError;

// Default retry schedule
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_BASE_DELAY_MS: u64 = 1000;
const DEFAULT_MAX_DELAY_MS: u64 = 10_000;

/// Retry schedule configuration from `corriere.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the initial attempt; zero means exactly one attempt.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl From<&crate::config::RetrySettings> for RetryConfig {
    fn from(settings: &crate::config::RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            base_delay_ms: settings.base_delay_ms,
            max_delay_ms: settings.max_delay_ms,
        }
    }
}

impl RetryConfig {
    /// Backoff before re-running attempt number `attempt` (zero-based).
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
        let delay = self
            .base_delay_ms
            .saturating_mul(factor)
            .min(self.max_delay_ms);
        Duration::from_millis(delay)
    }
}

/// Executes an async operation under the configured retry schedule.
#[derive(Debug, Clone)]
pub struct RetryHandler {
    config: RetryConfig,
}

impl RetryHandler {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Run `operation`, retrying retryable failures up to `max_retries`
    /// times with exponential backoff. The last error is returned once the
    /// schedule is exhausted.
    pub async fn execute<T, F, Fut>(&self, label: &str, operation: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= self.config.max_retries => return Err(err),
                Err(err) => {
                    let delay = self.config.backoff_delay(attempt);
                    warn!(
                        target: "corriere::client",
                        label,
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "backend request failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    fn baseline_schedule() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }

    #[test]
    fn backoff_doubles_per_attempt_and_caps() {
        let config = baseline_schedule();
        assert_eq!(config.backoff_delay(0), Duration::from_millis(1000));
        assert_eq!(config.backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(config.backoff_delay(2), Duration::from_millis(4000));
        assert_eq!(config.backoff_delay(3), Duration::from_millis(8000));
        assert_eq!(config.backoff_delay(4), Duration::from_millis(10_000));
        assert_eq!(config.backoff_delay(60), Duration::from_millis(10_000));
    }

    #[tokio::test(start_paused = true)]
    async fn retryable_failures_exhaust_the_schedule() {
        let handler = RetryHandler::new(baseline_schedule());
        let attempts = AtomicU32::new(0);

        let started = tokio::time::Instant::now();
        let result: Result<(), _> = handler
            .execute("blog_posts", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ClientError::from_status(503, "unavailable")) }
            })
            .await;

        assert!(result.is_err());
        // Initial attempt plus three retries.
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        // 1000 + 2000 + 4000 ms of backoff between the four attempts.
        assert_eq!(started.elapsed(), Duration::from_millis(7000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_failure_aborts_immediately() {
        let handler = RetryHandler::new(baseline_schedule());
        let attempts = AtomicU32::new(0);

        let started = tokio::time::Instant::now();
        let result: Result<(), _> = handler
            .execute("blog_posts", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ClientError::from_status(404, "not found")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_max_retries_means_exactly_one_attempt() {
        let handler = RetryHandler::new(RetryConfig {
            max_retries: 0,
            ..baseline_schedule()
        });
        let attempts = AtomicU32::new(0);

        let result: Result<(), _> = handler
            .execute("team_members", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(ClientError::from_status(500, "internal")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn success_after_transient_failure_returns_value() {
        let handler = RetryHandler::new(baseline_schedule());
        let attempts = AtomicU32::new(0);

        let result = handler
            .execute("case_studies", || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(ClientError::from_status(502, "bad gateway"))
                    } else {
                        Ok(n)
                    }
                }
            })
            .await;

        assert_eq!(result.expect("third attempt succeeds"), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
