//! Retrying transient provider failures
//!
//! Network errors and upstream 5xx-style failures back off exponentially.
//! A throttled request waits at least one rate-limit window, since retrying
//! sooner only burns another call from the provider's quota.

use crate::error::{DataError, Result};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Calls made in total, the first one included
    pub max_attempts: u32,
    /// Wait before the first retry; doubled for each one after
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Minimum wait after a rate-limit answer
    pub rate_limit_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            rate_limit_delay: Duration::from_secs(12),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            ..Self::default()
        }
    }

    /// Single attempt, no waiting
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            rate_limit_delay: Duration::ZERO,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Space retries after throttling so `calls_per_minute` is respected
    pub fn with_rate_limit(mut self, calls_per_minute: u32) -> Self {
        self.rate_limit_delay = Duration::from_secs(60) / calls_per_minute.max(1);
        self
    }

    /// Wait before retry number `retry` (1-based) after `error`
    pub fn delay_for(&self, error: &DataError, retry: u32) -> Duration {
        let doublings = retry.saturating_sub(1).min(16);
        let backoff = self
            .base_delay
            .saturating_mul(1 << doublings)
            .min(self.max_delay);
        match error {
            DataError::RateLimitExceeded { .. } => backoff.max(self.rate_limit_delay),
            _ => backoff,
        }
    }

    /// Call `operation` until it succeeds, fails for good, or the attempts
    /// run out; the last error is returned
    pub async fn run<T, F, Fut>(&self, call: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut retry = 0;
        loop {
            let error = match operation().await {
                Ok(value) => {
                    if retry > 0 {
                        tracing::debug!(call, retries = retry, "Provider call recovered");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            retry += 1;
            if !error.is_retryable() || retry >= attempts {
                tracing::warn!(call, attempts = retry, "Provider call failed: {error}");
                return Err(error);
            }

            let delay = self.delay_for(&error, retry);
            tracing::warn!(
                call,
                attempt = retry,
                of = attempts,
                delay_ms = delay.as_millis() as u64,
                "Provider call failed, retrying: {error}"
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited() -> DataError {
        DataError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        }
    }

    fn quick() -> RetryPolicy {
        RetryPolicy::new(3, Duration::from_millis(1)).with_max_delay(Duration::from_millis(4))
    }

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(300));
        let error = DataError::upstream("Alpha Vantage", "502");

        assert_eq!(policy.delay_for(&error, 1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(&error, 2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(&error, 3), Duration::from_millis(300));
        assert_eq!(policy.delay_for(&error, 40), Duration::from_millis(300));
    }

    #[test]
    fn test_rate_limit_waits_a_window() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100)).with_rate_limit(5);
        assert_eq!(policy.rate_limit_delay, Duration::from_secs(12));
        assert_eq!(policy.delay_for(&rate_limited(), 1), Duration::from_secs(12));

        let generous = policy.with_rate_limit(600);
        assert_eq!(
            generous.delay_for(&rate_limited(), 1),
            Duration::from_millis(100)
        );
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = quick()
            .run("TIME_SERIES_DAILY", || {
                let counter = Arc::clone(&counter);
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(DataError::upstream("Alpha Vantage", "timeout"))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(tokio_test::assert_ok!(result), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let policy = RetryPolicy {
            rate_limit_delay: Duration::ZERO,
            ..quick()
        };

        let result = policy
            .run("OVERVIEW", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>(rate_limited()) }
            })
            .await;

        assert!(matches!(result, Err(DataError::RateLimitExceeded { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = quick()
            .run("OVERVIEW", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>(DataError::unavailable("ZZZZ", "unknown symbol")) }
            })
            .await;

        tokio_test::assert_err!(result);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_makes_one_call() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let result = RetryPolicy::disabled()
            .run("CASH_FLOW", || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>(DataError::upstream("Alpha Vantage", "503")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
