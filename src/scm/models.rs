//! Wire models for the source-control platform API.

use serde::{Deserialize, Serialize};

/// One file touched by a pull request or commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub filename: String,
    pub status: ChangeStatus,
}

/// How a changed file was modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Modified,
    Removed,
    Renamed,
    /// Platforms occasionally grow new statuses; treat anything unknown as
    /// analyzable rather than failing the run.
    #[serde(other)]
    Other,
}

impl ChangedFile {
    /// Removed files have no content to analyze.
    pub fn is_analyzable(&self) -> bool {
        self.status != ChangeStatus::Removed
    }
}

/// Commit status states accepted by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

/// Request body for creating a commit status.
#[derive(Debug, Clone, Serialize)]
pub struct CommitStatusRequest {
    pub state: CommitState,
    pub description: String,
    pub context: String,
}

/// An existing issue/pull-request comment, as returned by the platform.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueComment {
    pub id: u64,
    pub body: String,
}

/// Request body for creating or updating a comment.
#[derive(Debug, Clone, Serialize)]
pub struct CommentRequest<'a> {
    pub body: &'a str,
}

/// Wrapper object the commit-files endpoint returns.
#[derive(Debug, Clone, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub files: Vec<ChangedFile>,
}
