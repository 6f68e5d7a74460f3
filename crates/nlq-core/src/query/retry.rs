//! Bounded retry for remote fetches.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::SourceError;

/// Default number of attempts, the first one included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Fixed-delay retry policy for transient source failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included. Zero is treated as one.
    pub max_attempts: usize,
    /// Delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create the default policy: three attempts, two seconds apart.
    pub fn new() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// Set the number of attempts.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Run `op` until it succeeds, fails terminally, or attempts run out.
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, SourceError>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, SourceError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < max_attempts => {
                    warn!(
                        attempt,
                        max_attempts,
                        delay_ms = self.delay.as_millis() as u64,
                        error = %err,
                        "Transient source failure, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_attempted_three_times() {
        let attempts = AtomicUsize::new(0);
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = RetryPolicy::new()
            .run(|_| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::Http {
                    status: 503,
                    message: "unavailable".into(),
                })
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert_eq!(
            result.unwrap_err(),
            SourceError::Http {
                status: 503,
                message: "unavailable".into()
            }
        );
        assert!(started.elapsed() >= DEFAULT_RETRY_DELAY * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_attempted_once() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = RetryPolicy::new()
            .run(|_| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::MalformedPayload("not json".into()))
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(SourceError::MalformedPayload(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_not_retried() {
        let attempts = AtomicUsize::new(0);

        let result: Result<(), _> = RetryPolicy::new()
            .run(|_| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::Unauthorized)
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(result.unwrap_err(), SourceError::Unauthorized);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_second_attempt() {
        let result = RetryPolicy::new()
            .run(|attempt| async move {
                if attempt == 1 {
                    Err(SourceError::Timeout)
                } else {
                    Ok(attempt)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_runs_once() {
        let attempts = AtomicUsize::new(0);

        let _: Result<(), _> = RetryPolicy::new()
            .with_max_attempts(0)
            .run(|_| async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(SourceError::Timeout)
            })
            .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
