#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Styleguard
//!
//! CI integration that submits text files to a remote style-analysis service and
//! publishes the results back to the source-control platform as commit statuses,
//! pull-request comments, and job summaries.
//!
//! ## Overview
//!
//! A run resolves which files to analyze (explicit paths, the files of a pull
//! request, or the files of a commit), dispatches one analysis job per file through
//! the bounded-concurrency batch dispatcher, renders the aggregate results as
//! markdown, and publishes them. Transient per-file failures are retried with
//! capped exponential backoff; auth failures and server errors abort the whole
//! batch early instead of burning quota against a service that is already failing.
//!
//! ## Module Organization
//!
//! - [`dispatch`] - bounded-concurrency batch dispatcher, retry/backoff, error
//!   classification
//! - [`client`] - style-analysis service client
//! - [`scm`] - source-control platform client (statuses, comments, job summaries)
//! - [`report`] - markdown rendering of analysis results
//! - [`config`] - layered configuration with CI environment fallbacks
//! - [`files`] - local file discovery and reading
//! - [`error`] - structured error handling
//! - [`logging`] - tracing initialization
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use styleguard::dispatch::{BatchDispatcher, RetryPolicy};
//!
//! # tokio_test::block_on(async {
//! let dispatcher = BatchDispatcher::new(4, RetryPolicy::batch());
//! let jobs = vec!["README.md".to_string(), "docs/guide.md".to_string()];
//!
//! let lengths = dispatcher
//!     .dispatch(&jobs, |path| async move { Ok(path.len()) })
//!     .await
//!     .unwrap();
//! assert_eq!(lengths.len(), 2);
//! # });
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod files;
pub mod logging;
pub mod report;
pub mod scm;

pub use client::{AnalysisClient, DocumentAnalyzer, FileAnalysis, Severity, StyleIssue};
pub use config::{load_config, StyleguardConfig};
pub use dispatch::{BatchDispatcher, RetryPolicy, DEFAULT_MAX_CONCURRENCY};
pub use error::{Result, StyleguardError};
