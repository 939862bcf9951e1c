//! Bounded retry with exponential backoff
//!
//! One attempt is in flight at a time. Between attempts the loop sleeps for
//! the backoff delay; there is no cancellation once a wait has started.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::response_error::{
    create_error_object, is_retryable_error, ErrorSource, ResponseErrorBoundary,
};

/// Retry settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first
    pub max_attempts: u32,
    /// Delay after the first failed attempt, doubled for each later one
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    /// Backoff after failed attempt `attempt` (1-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Backoff in milliseconds with the default policy: `1000 * 2^(attempt-1)`,
/// capped at 30 seconds
pub fn get_retry_delay(attempt: u32) -> u64 {
    RetryPolicy::default().delay_for_attempt(attempt).as_millis() as u64
}

/// Run `operation` up to `max_attempts` times with the default backoff
pub async fn with_retry<F, Fut, T, E>(
    operation: F,
    max_attempts: u32,
    context: Option<&str>,
) -> Result<T, ResponseErrorBoundary>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ErrorSource,
{
    let policy = RetryPolicy {
        max_attempts,
        ..Default::default()
    };
    with_retry_policy(operation, &policy, context).await
}

/// Run `operation` under `policy`
///
/// Non-retryable failures return after the attempt that produced them. When
/// every attempt fails, the error context records how many were made.
pub async fn with_retry_policy<F, Fut, T, E>(
    mut operation: F,
    policy: &RetryPolicy,
    context: Option<&str>,
) -> Result<T, ResponseErrorBoundary>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ErrorSource,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let failure = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => e.error_shape(),
        };

        let classified = create_error_object(&failure, context, None);
        if !is_retryable_error(&classified) {
            return Err(ResponseErrorBoundary {
                error_info: classified,
                attempts: attempt,
            });
        }

        if attempt >= max_attempts {
            let exhausted = match context {
                Some(ctx) => format!("{} (failed after {} attempts)", ctx, attempt),
                None => format!("Failed after {} attempts", attempt),
            };
            return Err(ResponseErrorBoundary {
                error_info: create_error_object(&failure, Some(&exhausted), None),
                attempts: attempt,
            });
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %classified.message,
            "Attempt failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response_error::{ErrorShape, ErrorType};
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[test]
    fn test_get_retry_delay() {
        assert_eq!(get_retry_delay(1), 1000);
        assert_eq!(get_retry_delay(2), 2000);
        assert_eq!(get_retry_delay(4), 8000);
        assert_eq!(get_retry_delay(5), 16000);
        assert_eq!(get_retry_delay(6), 30000);
        assert_eq!(get_retry_delay(10), 30000);
        assert_eq!(get_retry_delay(100), 30000);
        assert_eq!(get_retry_delay(0), 1000);

        let delays: Vec<u64> = (1..=12).map(get_retry_delay).collect();
        assert!(delays.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_custom_policy_delay() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failures_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let started = Instant::now();

        let result = with_retry(
            || {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if n < 3 {
                        Err(ErrorShape::named("NetworkError", "connection dropped"))
                    } else {
                        Ok("quoted")
                    }
                }
            },
            3,
            None,
        )
        .await;

        assert_eq!(result.unwrap(), "quoted");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s + 2s of backoff on the paused clock
        assert!(started.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_failure_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ErrorShape::named("ValidationError", "Missing incoterm")) }
            },
            3,
            Some("Saving response"),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.attempts, 1);
        assert_eq!(err.error_info.error_type, ErrorType::Validation);
        assert_eq!(err.error_info.message, "Saving response: Missing incoterm");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unauthorized_is_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ErrorShape::http(401, "Unauthorized")) }
            },
            5,
            None,
        )
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_note_count() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ErrorShape::http(503, "Service Unavailable")) }
            },
            3,
            Some("Loading responses"),
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(err.attempts, 3);
        assert_eq!(err.error_info.error_type, ErrorType::Network);
        assert!(err
            .error_info
            .message
            .starts_with("Loading responses (failed after 3 attempts): Server error (503)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = with_retry(
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err(ErrorShape::message("odd failure")) }
            },
            0,
            None,
        )
        .await;

        let err = result.unwrap_err();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(err.error_info.message, "Failed after 1 attempts: odd failure");
    }
}
