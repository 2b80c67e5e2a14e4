//! # Configuration
//!
//! Layered configuration for the CI run: a TOML file (`styleguard.toml`) provides the
//! base, `STYLEGUARD_*` environment variables override it, and well-known CI variables
//! fill in repository/commit/pull-request identity when the file leaves them out.
//! Everything is validated once at startup; the rest of the crate consumes plain
//! structs.

pub mod loader;

use crate::dispatch::{RetryPolicy, DEFAULT_MAX_CONCURRENCY};
use crate::error::{Result, StyleguardError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub use loader::load_config;

/// Top-level configuration for one styleguard run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleguardConfig {
    pub analysis: AnalysisApiConfig,
    pub scm: ScmConfig,
    pub dispatch: DispatchSettings,
    pub report: ReportConfig,
}

/// Remote style-analysis service endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisApiConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_ms: u64,
}

impl Default for AnalysisApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            token: String::new(),
            timeout_ms: 30_000,
        }
    }
}

/// Source-control platform endpoint and run identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScmConfig {
    pub base_url: String,
    pub token: String,
    /// `owner/name` form; filled from CI environment when absent.
    pub repository: Option<String>,
    pub commit_sha: Option<String>,
    pub pull_request: Option<u64>,
    /// Job-summary file the CI runner renders after the job, when the platform
    /// provides one.
    pub summary_path: Option<PathBuf>,
}

impl Default for ScmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: String::new(),
            repository: None,
            commit_sha: None,
            pull_request: None,
            summary_path: None,
        }
    }
}

/// Batch dispatcher tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    pub max_concurrency: usize,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        let policy = RetryPolicy::batch();
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_attempts: policy.max_attempts,
            base_delay_ms: policy.base_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
        }
    }
}

impl DispatchSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            backoff_multiplier: self.backoff_multiplier,
        }
    }
}

/// Result publishing behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Ceiling on the rendered pull-request comment; platforms reject oversized
    /// bodies.
    pub max_comment_bytes: usize,
    pub post_comment: bool,
    pub set_status: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            max_comment_bytes: 65_536,
            post_comment: true,
            set_status: true,
        }
    }
}

impl StyleguardConfig {
    /// Validate invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.base_url.is_empty() {
            return Err(StyleguardError::Configuration(
                "analysis.base_url must be set".to_string(),
            ));
        }
        if self.dispatch.max_concurrency == 0 {
            return Err(StyleguardError::Configuration(
                "dispatch.max_concurrency must be positive".to_string(),
            ));
        }
        if self.report.max_comment_bytes == 0 {
            return Err(StyleguardError::Configuration(
                "report.max_comment_bytes must be positive".to_string(),
            ));
        }
        self.dispatch.retry_policy().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_dispatch_contract() {
        let settings = DispatchSettings::default();
        assert_eq!(settings.max_concurrency, 100);
        let policy = settings.retry_policy();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.base_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_delay, Duration::from_millis(10_000));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validation_requires_analysis_url() {
        let config = StyleguardConfig::default();
        assert!(config.validate().is_err());

        let mut config = StyleguardConfig::default();
        config.analysis.base_url = "https://style.example.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = StyleguardConfig::default();
        config.analysis.base_url = "https://style.example.com".to_string();
        config.dispatch.max_concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_documents_merge_with_defaults() {
        let parsed: StyleguardConfig = serde_json::from_value(serde_json::json!({
            "analysis": { "base_url": "https://style.example.com" },
            "dispatch": { "max_concurrency": 8 }
        }))
        .unwrap();
        assert_eq!(parsed.dispatch.max_concurrency, 8);
        // Untouched sections keep their defaults.
        assert_eq!(parsed.dispatch.max_attempts, 2);
        assert_eq!(parsed.scm.base_url, "https://api.github.com");
    }
}
