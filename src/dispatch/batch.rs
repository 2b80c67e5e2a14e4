//! # Batch Dispatcher
//!
//! Runs one analysis job per file against the remote style service under a
//! concurrency cap, retrying transient failures with backoff and aborting the whole
//! batch as soon as any failure is classified fatal (auth failure, server error).
//!
//! ## Shape of a batch
//!
//! Every job is spawned up front and immediately parks on the concurrency limiter;
//! at most `max_concurrency` jobs are in flight at once. Each settle (success or
//! failure) updates the shared progress record inside one critical section, then the
//! dispatcher scans the failed outcomes for a fatal error. On the success path the
//! result list preserves input order with failed jobs omitted; on the fatal path the
//! caller gets the triggering error and no results at all, while in-flight jobs
//! drain in the background and their outcomes are discarded.
//!
//! All structures live for one `dispatch` call; nothing is shared across batches.

use crate::dispatch::backoff::RetryPolicy;
use crate::dispatch::classifier::scan_for_fatal_failure;
use crate::dispatch::latch::FatalLatch;
use crate::dispatch::limiter::ConcurrencyLimiter;
use crate::dispatch::progress::BatchProgress;
use crate::dispatch::retry::with_retry_until_fatal;
use crate::error::{Result, StyleguardError};
use dashmap::DashMap;
use futures::FutureExt;
use parking_lot::Mutex;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Default cap on concurrently in-flight analysis calls.
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Wall-clock cadence of the informational progress log line.
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Dispatches a list of analysis jobs with bounded concurrency and retries.
#[derive(Debug, Clone)]
pub struct BatchDispatcher {
    max_concurrency: usize,
    retry_policy: RetryPolicy,
}

impl Default for BatchDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CONCURRENCY, RetryPolicy::batch())
    }
}

impl BatchDispatcher {
    /// Create a dispatcher. `max_concurrency` must be positive; the policy should
    /// already be validated (configuration loading does so).
    pub fn new(max_concurrency: usize, retry_policy: RetryPolicy) -> Self {
        debug_assert!(max_concurrency > 0, "max_concurrency must be positive");
        Self {
            max_concurrency,
            retry_policy,
        }
    }

    /// Run `executor` once per job and collect the successful results in input
    /// order.
    ///
    /// Ordinary failures are logged and omitted from the result list. A fatal
    /// failure (unauthorized, server error) aborts the batch: not-yet-started jobs
    /// are never admitted, no further retry attempts start, and the triggering
    /// error is returned instead of a partial result list. An empty job list
    /// returns immediately with no side effects.
    pub async fn dispatch<T, F, Fut>(&self, jobs: &[String], executor: F) -> Result<Vec<T>>
    where
        T: Send + 'static,
        F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        let batch_id = Uuid::new_v4();
        let total = jobs.len();
        info!(
            batch_id = %batch_id,
            total = total,
            max_concurrency = self.max_concurrency,
            "📦 Processing {total} files..."
        );

        let limiter = ConcurrencyLimiter::new(self.max_concurrency);
        let latch = FatalLatch::new();
        let progress = Arc::new(Mutex::new(BatchProgress::<T>::new(jobs)));
        let in_flight: Arc<DashMap<usize, (String, Instant)>> = Arc::new(DashMap::new());
        let (settle_tx, mut settle_rx) = mpsc::unbounded_channel::<()>();

        for (index, job) in jobs.iter().enumerate() {
            tokio::spawn(run_job(
                index,
                job.clone(),
                executor.clone(),
                self.retry_policy.clone(),
                limiter.clone(),
                latch.clone(),
                Arc::clone(&progress),
                Arc::clone(&in_flight),
                settle_tx.clone(),
            ));
        }
        drop(settle_tx);

        let mut ticker = interval_at(
            Instant::now() + PROGRESS_LOG_INTERVAL,
            PROGRESS_LOG_INTERVAL,
        );

        loop {
            tokio::select! {
                settled = settle_rx.recv() => {
                    if settled.is_none() {
                        break;
                    }
                    let (counts, scan) = {
                        let guard = progress.lock();
                        (guard.counts(), scan_for_fatal_failure(guard.counts().failed, guard.outcomes()))
                    };
                    debug!(
                        batch_id = %batch_id,
                        completed = counts.completed,
                        failed = counts.failed,
                        total = counts.total,
                        "Job settled"
                    );
                    if let Some(fatal) = scan.error {
                        latch.set(fatal.clone());
                        limiter.close();
                        error!(
                            batch_id = %batch_id,
                            completed = counts.completed,
                            failed = counts.failed,
                            total = counts.total,
                            error = %fatal,
                            "🛑 Fatal error detected, aborting batch"
                        );
                        return Err(fatal);
                    }
                    if counts.completed + counts.failed == counts.total {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    let counts = progress.lock().counts();
                    let oldest = in_flight
                        .iter()
                        .min_by_key(|entry| entry.value().1)
                        .map(|entry| {
                            let (job, started) = entry.value();
                            (job.clone(), started.elapsed().as_secs())
                        });
                    info!(
                        batch_id = %batch_id,
                        completed = counts.completed,
                        failed = counts.failed,
                        total = counts.total,
                        in_flight = counts.in_progress,
                        oldest_job = oldest.as_ref().map(|(job, _)| job.as_str()),
                        oldest_age_s = oldest.as_ref().map(|(_, age)| *age),
                        "⏳ Batch progress: {}/{} complete, {} failed",
                        counts.completed,
                        counts.total,
                        counts.failed
                    );
                }
            }
        }

        let mut guard = progress.lock();
        let counts = guard.counts();
        info!(
            batch_id = %batch_id,
            completed = counts.completed,
            failed = counts.failed,
            total = counts.total,
            "✅ Batch analysis complete"
        );
        Ok(guard.take_results())
    }
}

/// One job's lifecycle: admission, retry-wrapped execution, settle.
#[allow(clippy::too_many_arguments)]
async fn run_job<T, F, Fut>(
    index: usize,
    job: String,
    executor: F,
    retry_policy: RetryPolicy,
    limiter: ConcurrencyLimiter,
    latch: FatalLatch,
    progress: Arc<Mutex<BatchProgress<T>>>,
    in_flight: Arc<DashMap<usize, (String, Instant)>>,
    settle_tx: mpsc::UnboundedSender<()>,
) where
    T: Send + 'static,
    F: Fn(String) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    if latch.is_set() {
        return;
    }
    let permit = match limiter.acquire().await {
        Ok(permit) => permit,
        // The limiter only closes after a fatal error; this job never started.
        Err(_) => return,
    };
    if latch.is_set() {
        return;
    }

    progress.lock().mark_in_progress(index);
    in_flight.insert(index, (job.clone(), Instant::now()));

    // Each attempt is unwind-caught so a panicking executor surfaces as an ordinary
    // per-job error instead of killing the task without settling.
    let operation = {
        let executor = executor.clone();
        let job = job.clone();
        move || {
            AssertUnwindSafe(executor(job.clone()))
                .catch_unwind()
                .map(|outcome| match outcome {
                    Ok(result) => result,
                    Err(payload) => Err(StyleguardError::from_panic(payload)),
                })
        }
    };
    let result = with_retry_until_fatal(&job, &retry_policy, &latch, operation).await;

    drop(permit);
    in_flight.remove(&index);

    {
        let mut guard = progress.lock();
        match result {
            Ok(value) => guard.settle_success(index, value),
            Err(err) => {
                warn!("📄 {job}: {err}");
                guard.settle_failure(index, err);
            }
        }
    }
    let _ = settle_tx.send(());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_empty_batch_returns_immediately() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_ref = calls.clone();

        let dispatcher = BatchDispatcher::default();
        let results: Vec<u32> = dispatcher
            .dispatch(&[], move |_job| {
                let calls = calls_ref.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                }
            })
            .await
            .unwrap();

        assert!(results.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_results_preserve_input_order() {
        let jobs: Vec<String> = (0..6).map(|i| format!("doc-{i}.md")).collect();
        let dispatcher = BatchDispatcher::new(2, RetryPolicy::batch());

        let results = dispatcher
            .dispatch(&jobs, |job| async move {
                // Later files finish faster, so completion order inverts input order.
                let rank: u64 = job
                    .trim_start_matches("doc-")
                    .trim_end_matches(".md")
                    .parse()
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(30 - rank * 5)).await;
                Ok(job)
            })
            .await
            .unwrap();

        assert_eq!(results, jobs);
    }

    #[tokio::test]
    async fn test_panicking_job_is_normalized_not_propagated() {
        let jobs: Vec<String> = vec!["ok.md".to_string(), "boom.md".to_string()];
        let single_attempt = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        let dispatcher = BatchDispatcher::new(2, single_attempt);

        let results = dispatcher
            .dispatch(&jobs, |job| async move {
                if job == "boom.md" {
                    panic!("executor bug for {job}");
                }
                Ok(job)
            })
            .await
            .unwrap();

        // The panic became an ordinary per-job failure.
        assert_eq!(results, vec!["ok.md".to_string()]);
    }
}
