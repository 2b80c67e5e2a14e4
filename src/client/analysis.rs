//! # Style Analysis Client
//!
//! Thin async wrapper over the remote style-analysis API. The interesting part is
//! the status mapping: responses are folded onto the crate error taxonomy so the
//! batch dispatcher can tell batch-ending failures (401, 5xx) from per-document
//! ones (422 validation) without inspecting HTTP details itself.

use crate::client::models::{AnalyzeRequest, ApiErrorBody, FileAnalysis};
use crate::config::AnalysisApiConfig;
use crate::error::{Result, StyleguardError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// Seam between the dispatcher wiring and the real HTTP client; tests substitute
/// an in-memory implementation.
#[async_trait]
pub trait DocumentAnalyzer: Send + Sync {
    async fn analyze(&self, path: &str, content: &str) -> Result<FileAnalysis>;
}

/// HTTP client for the style service.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl AnalysisClient {
    pub fn new(config: &AnalysisApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(concat!("styleguard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl DocumentAnalyzer for AnalysisClient {
    async fn analyze(&self, path: &str, content: &str) -> Result<FileAnalysis> {
        let url = format!("{}/v1/analyze", self.base_url);
        debug!(path = %path, bytes = content.len(), "Submitting document for analysis");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&AnalyzeRequest { path, content })
            .send()
            .await?;

        let status = response.status().as_u16();
        if response.status().is_success() {
            let analysis = response.json::<FileAnalysis>().await?;
            debug!(
                path = %path,
                issues = analysis.issues.len(),
                "Analysis response received"
            );
            return Ok(analysis);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, path, &body))
    }
}

/// Fold a non-success response onto the error taxonomy. The body is parsed as the
/// service's JSON error shape when possible, otherwise used verbatim.
fn error_from_response(status: u16, path: &str, body: &str) -> StyleguardError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("status {status} with empty body")
            } else {
                body.to_string()
            }
        });
    StyleguardError::from_analysis_status(status, path, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_response_maps_to_fatal_kind() {
        let err = error_from_response(401, "doc.md", r#"{"message":"token expired"}"#);
        assert_eq!(
            err,
            StyleguardError::Unauthorized {
                message: "token expired".to_string()
            }
        );
    }

    #[test]
    fn test_server_error_maps_to_internal_kind() {
        let err = error_from_response(503, "doc.md", "upstream overloaded");
        assert_eq!(
            err,
            StyleguardError::InternalServerError {
                message: "upstream overloaded".to_string()
            }
        );
    }

    #[test]
    fn test_validation_response_carries_the_path() {
        let err = error_from_response(422, "notes/doc.md", r#"{"message":"not valid utf-8"}"#);
        assert_eq!(
            err,
            StyleguardError::Validation {
                path: "notes/doc.md".to_string(),
                reason: "not valid utf-8".to_string()
            }
        );
    }

    #[test]
    fn test_other_statuses_keep_their_code() {
        let err = error_from_response(429, "doc.md", "");
        assert_eq!(err.status_code(), Some(429));
        assert!(matches!(err, StyleguardError::Api { status: 429, .. }));
    }
}
