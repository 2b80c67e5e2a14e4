//! # Retry Executor
//!
//! Wraps a single fallible async operation with capped exponential backoff. Each
//! non-final failure emits a retry warning carrying the attempt number, the computed
//! delay, and the error; exhaustion emits a failure event and propagates the last
//! error unchanged. A success returns immediately with no trailing delay.
//!
//! Backoff waits suspend only the calling task; concurrent jobs keep running.

use crate::dispatch::backoff::RetryPolicy;
use crate::dispatch::latch::FatalLatch;
use crate::error::{Result, StyleguardError};
use std::future::Future;
use tokio::time::sleep;
use tracing::{error, warn};

/// Run `operation` up to `policy.max_attempts` times with backoff between failures.
///
/// `label` identifies the operation in log events (typically the file path being
/// analyzed). The final error is never swallowed.
pub async fn with_retry<T, F, Fut>(label: &str, policy: &RetryPolicy, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_loop(label, policy, None, operation).await
}

/// Latch-aware variant used by the batch dispatcher: once the latch is set, no new
/// attempt is started and no backoff wait is entered. The current attempt is always
/// allowed to finish.
pub(crate) async fn with_retry_until_fatal<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    latch: &FatalLatch,
    operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry_loop(label, policy, Some(latch), operation).await
}

async fn retry_loop<T, F, Fut>(
    label: &str,
    policy: &RetryPolicy,
    latch: Option<&FatalLatch>,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 1u32;
    loop {
        if let Some(latch) = latch {
            if latch.is_set() {
                return Err(StyleguardError::BatchAborted {
                    message: format!("'{label}' cancelled before attempt {attempt}"),
                });
            }
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < policy.max_attempts => {
                if let Some(latch) = latch {
                    if latch.is_set() {
                        return Err(StyleguardError::BatchAborted {
                            message: format!("'{label}' cancelled after attempt {attempt}"),
                        });
                    }
                }
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    operation = %label,
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "🔄 Retrying after failure"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                error!(
                    operation = %label,
                    attempts = policy.max_attempts,
                    error = %err,
                    "❌ All retry attempts exhausted"
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::Instant;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(400),
            backoff_multiplier: 2.0,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_calls_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let started = Instant::now();
        let result = with_retry("doc.md", &fast_policy(3), move || {
            let calls = calls_ref.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, StyleguardError>(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // No delay follows a successful attempt.
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_failures_stops_retrying() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let result = with_retry("doc.md", &fast_policy(5), move || {
            let calls = calls_ref.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if n < 3 {
                    Err(StyleguardError::Network {
                        message: format!("attempt {n} refused"),
                    })
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_calls_max_attempts_and_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();

        let result: Result<()> = with_retry("doc.md", &fast_policy(3), move || {
            let calls = calls_ref.clone();
            async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Err(StyleguardError::Network {
                    message: format!("attempt {n} refused"),
                })
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        match result {
            Err(StyleguardError::Network { message }) => {
                assert_eq!(message, "attempt 3 refused");
            }
            other => panic!("expected last network error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_delays_follow_policy() {
        let policy = fast_policy(3);
        let started = Instant::now();

        let _: Result<()> = with_retry("doc.md", &policy, move || async move {
            Err(StyleguardError::Network {
                message: "down".to_string(),
            })
        })
        .await;

        // 100ms after attempt 1 plus 200ms after attempt 2; none after the final one.
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latch_stops_new_attempts() {
        let latch = FatalLatch::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_ref = calls.clone();
        let latch_for_op = latch.clone();

        let result: Result<()> =
            with_retry_until_fatal("doc.md", &fast_policy(5), &latch, move || {
                let calls = calls_ref.clone();
                let latch = latch_for_op.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    // A sibling job discovers a fatal error while this one is failing.
                    latch.set(StyleguardError::Unauthorized {
                        message: "expired token".to_string(),
                    });
                    Err(StyleguardError::Network {
                        message: "down".to_string(),
                    })
                }
            })
            .await;

        // The in-flight attempt completed, then the loop stopped instead of retrying.
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(StyleguardError::BatchAborted { .. })));
    }
}
