//! # Backoff Calculation
//!
//! Capped exponential delay computation for retry scheduling. The calculation is pure
//! and deterministic: for a given policy and attempt number the delay is always
//! `min(base_delay * backoff_multiplier^(attempt - 1), max_delay)`.

use crate::error::{Result, StyleguardError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration shared by the retry executor and the batch dispatcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt. Must be non-zero.
    pub base_delay: Duration,
    /// Ceiling applied to every computed delay. Must be at least `base_delay`.
    pub max_delay: Duration,
    /// Exponential growth factor between attempts. Must be greater than 1.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Policy used when dispatching a whole batch of files: one retry per file, so a
    /// persistently failing service exhausts quickly instead of multiplying attempts
    /// across hundreds of jobs.
    pub fn batch() -> Self {
        Self {
            max_attempts: 2,
            ..Self::default()
        }
    }

    /// Validate the policy invariants.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts < 1 {
            return Err(StyleguardError::Configuration(
                "retry max_attempts must be at least 1".to_string(),
            ));
        }
        if self.base_delay.is_zero() {
            return Err(StyleguardError::Configuration(
                "retry base_delay must be non-zero".to_string(),
            ));
        }
        if self.max_delay < self.base_delay {
            return Err(StyleguardError::Configuration(
                "retry max_delay must be at least base_delay".to_string(),
            ));
        }
        if self.backoff_multiplier <= 1.0 {
            return Err(StyleguardError::Configuration(
                "retry backoff_multiplier must be greater than 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Delay to wait after the given failed attempt. `attempt` is 1-based: the delay
    /// following the first failure uses `attempt = 1` and equals `base_delay`.
    ///
    /// The sequence is monotonically non-decreasing and clamped to `max_delay`; large
    /// attempt numbers saturate at the cap rather than overflowing.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        debug_assert!(attempt >= 1, "attempt numbers are 1-based");
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.backoff_multiplier.powi(exponent);
        let uncapped = self.base_delay.as_secs_f64() * factor;
        let capped = uncapped.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }
}
