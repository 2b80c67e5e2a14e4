//! # Batch Progress Tracking
//!
//! Mutable progress record owned by one dispatch call. Jobs settle concurrently, so
//! every transition here runs inside a single short critical section; the counts
//! always satisfy `completed + failed + in_progress + pending == total`, and outcome
//! indices are stable positions matching the input job list.

use crate::error::StyleguardError;
use serde::Serialize;

/// Lifecycle state of one job inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

/// Per-job outcome, kept at the job's original input position.
#[derive(Debug)]
pub struct JobOutcome<T> {
    pub index: usize,
    pub job: String,
    pub status: JobStatus,
    pub result: Option<T>,
    pub error: Option<StyleguardError>,
}

/// Snapshot of the aggregate counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressCounts {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

/// Progress record for one batch invocation.
#[derive(Debug)]
pub struct BatchProgress<T> {
    outcomes: Vec<JobOutcome<T>>,
    completed: usize,
    failed: usize,
    in_progress: usize,
    pending: usize,
}

impl<T> BatchProgress<T> {
    pub fn new(jobs: &[String]) -> Self {
        let outcomes = jobs
            .iter()
            .enumerate()
            .map(|(index, job)| JobOutcome {
                index,
                job: job.clone(),
                status: JobStatus::Pending,
                result: None,
                error: None,
            })
            .collect();

        Self {
            outcomes,
            completed: 0,
            failed: 0,
            in_progress: 0,
            pending: jobs.len(),
        }
    }

    pub fn counts(&self) -> ProgressCounts {
        ProgressCounts {
            total: self.outcomes.len(),
            completed: self.completed,
            failed: self.failed,
            in_progress: self.in_progress,
            pending: self.pending,
        }
    }

    /// Outcomes in stable index order.
    pub fn outcomes(&self) -> &[JobOutcome<T>] {
        &self.outcomes
    }

    pub fn settled(&self) -> usize {
        self.completed + self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.settled() == self.outcomes.len()
    }

    pub fn mark_in_progress(&mut self, index: usize) {
        let outcome = &mut self.outcomes[index];
        debug_assert_eq!(outcome.status, JobStatus::Pending);
        outcome.status = JobStatus::InProgress;
        self.pending -= 1;
        self.in_progress += 1;
    }

    pub fn settle_success(&mut self, index: usize, result: T) {
        let outcome = &mut self.outcomes[index];
        debug_assert_eq!(outcome.status, JobStatus::InProgress);
        outcome.status = JobStatus::Completed;
        outcome.result = Some(result);
        self.in_progress -= 1;
        self.completed += 1;
    }

    pub fn settle_failure(&mut self, index: usize, error: StyleguardError) {
        let outcome = &mut self.outcomes[index];
        debug_assert_eq!(outcome.status, JobStatus::InProgress);
        outcome.status = JobStatus::Failed;
        outcome.error = Some(error);
        self.in_progress -= 1;
        self.failed += 1;
    }

    /// Move the successful results out, preserving input order. Failed jobs are
    /// simply absent.
    pub fn take_results(&mut self) -> Vec<T> {
        self.outcomes
            .iter_mut()
            .filter(|outcome| outcome.status == JobStatus::Completed)
            .filter_map(|outcome| outcome.result.take())
            .collect()
    }
}
