//! Source-control platform integration.

pub mod client;
pub mod models;

pub use client::{write_job_summary, ScmClient, COMMENT_MARKER};
pub use models::{ChangeStatus, ChangedFile, CommitState};
