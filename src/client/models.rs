//! Wire models for the style-analysis service.

use serde::{Deserialize, Serialize};

/// Severity assigned to a single style issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Suggestion,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Suggestion => write!(f, "suggestion"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding the service reported against a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleIssue {
    pub line: u32,
    pub column: u32,
    pub severity: Severity,
    /// Identifier of the style rule that fired, e.g. `vocab.terms`.
    pub rule: String,
    pub message: String,
}

/// Analysis result for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAnalysis {
    pub path: String,
    pub issues: Vec<StyleIssue>,
}

impl FileAnalysis {
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|issue| issue.severity == Severity::Error)
    }
}

/// Request body for the analyze endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub path: &'a str,
    pub content: &'a str,
}

/// Error body the service returns on non-success statuses.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}
