//! Remote style-analysis service integration.

pub mod analysis;
pub mod models;

pub use analysis::{AnalysisClient, DocumentAnalyzer};
pub use models::{FileAnalysis, Severity, StyleIssue};
