//! # Error Classification
//!
//! Decides whether a failure should end the whole batch. Unauthorized responses and
//! server errors mean every remaining job would fail the same way, so continuing only
//! burns quota against a service that is already failing hard. Everything else
//! (validation failures, other 4xx) is a per-job problem and the batch continues.

use crate::dispatch::progress::{JobOutcome, JobStatus};
use crate::error::StyleguardError;

/// True when the error is severe enough to abort the batch: an unauthorized or
/// internal-server-error kind, or a numeric status of exactly 401 or 500 and above.
pub fn is_fatal_error(error: &StyleguardError) -> bool {
    if matches!(
        error,
        StyleguardError::Unauthorized { .. } | StyleguardError::InternalServerError { .. }
    ) {
        return true;
    }
    match error.status_code() {
        Some(401) => true,
        Some(status) => status >= 500,
        None => false,
    }
}

/// Result of scanning the outcome list for a batch-ending failure.
#[derive(Debug, Clone, Default)]
pub struct FatalScan {
    pub found: bool,
    pub error: Option<StyleguardError>,
}

/// Scan the failed outcomes for the first fatal error.
///
/// Short-circuits without scanning when `failed_count` is zero (the common case).
/// The outcome list is in stable index order, so when several fatal failures exist
/// the earliest-indexed one wins deterministically.
pub fn scan_for_fatal_failure<T>(failed_count: usize, outcomes: &[JobOutcome<T>]) -> FatalScan {
    if failed_count == 0 {
        return FatalScan::default();
    }

    for outcome in outcomes {
        if outcome.status != JobStatus::Failed {
            continue;
        }
        if let Some(error) = &outcome.error {
            if is_fatal_error(error) {
                return FatalScan {
                    found: true,
                    error: Some(error.clone()),
                };
            }
        }
    }

    FatalScan::default()
}
