//! # Batch Dispatch
//!
//! Bounded-concurrency execution of analysis jobs against the remote style service.
//!
//! ## Components
//!
//! - [`backoff`] - capped exponential delay computation and the [`RetryPolicy`]
//! - [`retry`] - retry executor wrapping one fallible async operation
//! - [`classifier`] - decides which failures end the whole batch
//! - [`limiter`] - counting-permit admission control with FIFO fairness
//! - [`progress`] - per-batch progress record with stable job indices
//! - [`latch`] - set-once fatal-error latch driving cooperative cancellation
//! - [`batch`] - the orchestrator composing all of the above
//!
//! The dispatcher's boundary is purely in-process: it consumes job identifiers, an
//! async executor function, and a retry policy; it produces an input-ordered result
//! list or the fatal error that aborted the batch.

pub mod backoff;
pub mod batch;
pub mod classifier;
pub mod latch;
pub mod limiter;
pub mod progress;
pub mod retry;

pub use backoff::RetryPolicy;
pub use batch::{BatchDispatcher, DEFAULT_MAX_CONCURRENCY};
pub use classifier::{is_fatal_error, scan_for_fatal_failure, FatalScan};
pub use latch::FatalLatch;
pub use limiter::{ConcurrencyLimiter, Permit};
pub use progress::{BatchProgress, JobOutcome, JobStatus, ProgressCounts};
pub use retry::with_retry;
