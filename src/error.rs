//! # Structured Error Handling
//!
//! Crate-wide error taxonomy. Every failure that crosses a module boundary is a
//! [`StyleguardError`], so the batch dispatcher can classify failures by machine-readable
//! kind and status code rather than by string matching.

use serde::{Deserialize, Serialize};

/// Errors produced by the analysis pipeline and its collaborators.
///
/// Variants carry owned strings so errors stay `Clone`: the dispatcher records a copy
/// in its per-job outcome list and may also surface the same error to the caller when
/// it aborts a batch.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum StyleguardError {
    /// The style service rejected our credentials (HTTP 401).
    #[error("unauthorized: {message}")]
    Unauthorized { message: String },

    /// The style service failed on its side (HTTP 5xx).
    #[error("style service internal error: {message}")]
    InternalServerError { message: String },

    /// Any other non-success response from the style service.
    #[error("style service returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The service could not analyze one document (malformed content, HTTP 422).
    #[error("validation failed for '{path}': {reason}")]
    Validation { path: String, reason: String },

    /// Transport-level failure before an HTTP status was obtained.
    #[error("network error: {message}")]
    Network { message: String },

    /// A source-control platform call failed.
    #[error("source control request failed with status {status}: {message}")]
    SourceControl { status: u16, message: String },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A local file could not be read or discovered.
    #[error("i/o error for '{path}': {message}")]
    Io { path: String, message: String },

    /// An analysis job panicked; the payload's string form is preserved.
    #[error("analysis job panicked: {message}")]
    JobPanicked { message: String },

    /// Work was cancelled because the batch hit a fatal error.
    #[error("batch aborted: {message}")]
    BatchAborted { message: String },
}

impl StyleguardError {
    /// HTTP status associated with this error, when one exists.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            StyleguardError::Unauthorized { .. } => Some(401),
            StyleguardError::InternalServerError { .. } => Some(500),
            StyleguardError::Api { status, .. } => Some(*status),
            StyleguardError::SourceControl { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Map a style-service response status onto the taxonomy.
    pub fn from_analysis_status(status: u16, path: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            401 => StyleguardError::Unauthorized { message },
            422 => StyleguardError::Validation {
                path: path.to_string(),
                reason: message,
            },
            s if s >= 500 => StyleguardError::InternalServerError { message },
            s => StyleguardError::Api { status: s, message },
        }
    }

    /// Normalize a panic payload into an error carrying its string form.
    pub fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        StyleguardError::JobPanicked { message }
    }
}

impl From<reqwest::Error> for StyleguardError {
    fn from(err: reqwest::Error) -> Self {
        StyleguardError::Network {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StyleguardError>;
