//! # Concurrency Limiter
//!
//! Counting-permit admission control for in-flight analysis calls. Built on
//! [`tokio::sync::Semaphore`], which wakes waiters in FIFO order, so no caller
//! starves under sustained contention and at most `capacity` permits are ever held
//! at once. There is no bound on how many callers may wait.
//!
//! Permits are RAII guards: dropping one releases it, so a permit cannot leak on any
//! failure path of the guarded operation. Closing the limiter makes every pending
//! and future acquisition fail, which is how the dispatcher stops admitting jobs
//! once a batch has hit a fatal error.

use crate::error::{Result, StyleguardError};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Admission slot held while one job is actively executing.
#[derive(Debug)]
pub struct Permit {
    _permit: OwnedSemaphorePermit,
}

/// Counting permit store with FIFO wake order.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting at most `capacity` concurrent holders.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "limiter capacity must be positive");
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Wait until a permit is available and take it.
    ///
    /// Suspends the caller without blocking other tasks. Fails only after
    /// [`close`](Self::close), which the dispatcher uses to cancel admission.
    pub async fn acquire(&self) -> Result<Permit> {
        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| StyleguardError::BatchAborted {
                message: "concurrency limiter closed".to_string(),
            })?;
        Ok(Permit { _permit: permit })
    }

    /// Stop granting permits; pending `acquire` calls fail immediately.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Permits not currently held. Zero while fully loaded.
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::sleep;

    #[tokio::test]
    async fn test_permits_are_counted() {
        let limiter = ConcurrencyLimiter::new(2);
        assert_eq!(limiter.capacity(), 2);
        assert_eq!(limiter.available(), 2);

        let first = limiter.acquire().await.unwrap();
        let second = limiter.acquire().await.unwrap();
        assert_eq!(limiter.available(), 0);

        drop(first);
        assert_eq!(limiter.available(), 1);
        drop(second);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_holders_never_exceed_capacity() {
        let limiter = ConcurrencyLimiter::new(2);
        let inside = Arc::new(AtomicUsize::new(0));
        let observed_max = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..5 {
            let limiter = limiter.clone();
            let inside = inside.clone();
            let observed_max = observed_max.clone();
            handles.push(tokio::spawn(async move {
                let _permit = limiter.acquire().await.unwrap();
                let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                observed_max.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(10)).await;
                inside.fetch_sub(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert!(observed_max.load(Ordering::SeqCst) <= 2);
        assert_eq!(inside.load(Ordering::SeqCst), 0);
        assert_eq!(limiter.available(), 2);
    }

    #[tokio::test]
    async fn test_permit_released_when_guarded_operation_fails() {
        let limiter = ConcurrencyLimiter::new(1);

        let failing: Result<()> = async {
            let _permit = limiter.acquire().await?;
            Err(StyleguardError::Network {
                message: "mid-operation failure".to_string(),
            })
        }
        .await;
        assert!(failing.is_err());

        // The permit dropped on the error path, so the next acquire succeeds at once.
        let _permit = limiter.acquire().await.unwrap();
    }

    #[tokio::test]
    async fn test_close_fails_pending_and_future_acquires() {
        let limiter = ConcurrencyLimiter::new(1);
        let held = limiter.acquire().await.unwrap();

        let waiting = {
            let limiter = limiter.clone();
            tokio::spawn(async move { limiter.acquire().await })
        };
        // Let the waiter queue up before closing.
        tokio::task::yield_now().await;
        limiter.close();

        let pending = waiting.await.unwrap();
        assert!(matches!(pending, Err(StyleguardError::BatchAborted { .. })));
        assert!(matches!(
            limiter.acquire().await,
            Err(StyleguardError::BatchAborted { .. })
        ));
        drop(held);
    }
}
