//! # Source-Control Client
//!
//! Thin wrapper over the platform's REST API: fetching the files a pull request or
//! commit touches, posting commit statuses, and upserting the analysis comment. All
//! failures map to [`StyleguardError::SourceControl`] with the response status, so
//! callers can log and move on without unpacking HTTP details.

use crate::config::ScmConfig;
use crate::error::{Result, StyleguardError};
use crate::scm::models::{
    ChangedFile, CommentRequest, CommitDetail, CommitState, CommitStatusRequest, IssueComment,
};
use std::time::Duration;
use tracing::{debug, info};

/// Marker embedded in the analysis comment so later runs update it in place
/// instead of stacking new comments on every push.
pub const COMMENT_MARKER: &str = "<!-- styleguard-report -->";

const PAGE_SIZE: usize = 100;

/// REST client bound to one repository.
#[derive(Debug, Clone)]
pub struct ScmClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    repository: String,
}

impl ScmClient {
    pub fn new(config: &ScmConfig) -> Result<Self> {
        let repository = config.repository.clone().ok_or_else(|| {
            StyleguardError::Configuration(
                "scm.repository is required for source-control operations".to_string(),
            )
        })?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("styleguard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            repository,
        })
    }

    /// Files touched by a pull request, across all pages.
    pub async fn pull_request_files(&self, number: u64) -> Result<Vec<ChangedFile>> {
        let mut files = Vec::new();
        let mut page = 1usize;
        loop {
            let url = format!(
                "{}/repos/{}/pulls/{number}/files?per_page={PAGE_SIZE}&page={page}",
                self.base_url, self.repository
            );
            let batch: Vec<ChangedFile> = self.get_json(&url).await?;
            let len = batch.len();
            files.extend(batch);
            if len < PAGE_SIZE {
                break;
            }
            page += 1;
        }
        debug!(pull_request = number, files = files.len(), "Fetched pull request files");
        Ok(files)
    }

    /// Files touched by a single commit.
    pub async fn commit_files(&self, sha: &str) -> Result<Vec<ChangedFile>> {
        let url = format!("{}/repos/{}/commits/{sha}", self.base_url, self.repository);
        let detail: CommitDetail = self.get_json(&url).await?;
        debug!(sha = %sha, files = detail.files.len(), "Fetched commit files");
        Ok(detail.files)
    }

    /// Create or overwrite the `styleguard` commit status on `sha`.
    pub async fn post_commit_status(
        &self,
        sha: &str,
        state: CommitState,
        description: &str,
    ) -> Result<()> {
        let url = format!("{}/repos/{}/statuses/{sha}", self.base_url, self.repository);
        let request = CommitStatusRequest {
            state,
            description: description.to_string(),
            context: "styleguard".to_string(),
        };
        self.send_checked(self.http.post(&url).json(&request)).await?;
        info!(sha = %sha, state = ?state, "📌 Commit status published");
        Ok(())
    }

    /// Create the analysis comment on a pull request, or update the existing one
    /// (found by [`COMMENT_MARKER`]) in place.
    pub async fn upsert_comment(&self, number: u64, body: &str) -> Result<()> {
        match self.find_marker_comment(number).await? {
            Some(comment_id) => {
                let url = format!(
                    "{}/repos/{}/issues/comments/{comment_id}",
                    self.base_url, self.repository
                );
                self.send_checked(self.http.patch(&url).json(&CommentRequest { body }))
                    .await?;
                info!(pull_request = number, comment_id, "💬 Analysis comment updated");
            }
            None => {
                let url = format!(
                    "{}/repos/{}/issues/{number}/comments",
                    self.base_url, self.repository
                );
                self.send_checked(self.http.post(&url).json(&CommentRequest { body }))
                    .await?;
                info!(pull_request = number, "💬 Analysis comment created");
            }
        }
        Ok(())
    }

    async fn find_marker_comment(&self, number: u64) -> Result<Option<u64>> {
        let url = format!(
            "{}/repos/{}/issues/{number}/comments?per_page={PAGE_SIZE}",
            self.base_url, self.repository
        );
        let comments: Vec<IssueComment> = self.get_json(&url).await?;
        Ok(comments
            .into_iter()
            .find(|comment| comment.body.contains(COMMENT_MARKER))
            .map(|comment| comment.id))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send_checked(self.http.get(url)).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_checked(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.bearer_auth(&self.token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(StyleguardError::SourceControl {
            status: status.as_u16(),
            message,
        })
    }
}

/// Append the rendered report to the CI job-summary file, when the runner provides
/// one.
pub fn write_job_summary(path: &std::path::Path, markdown: &str) -> Result<()> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StyleguardError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
    writeln!(file, "{markdown}").map_err(|e| StyleguardError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    info!(path = %path.display(), "📝 Job summary written");
    Ok(())
}
