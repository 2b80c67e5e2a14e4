//! # Report Rendering
//!
//! Markdown output for the three publishing surfaces: the pull-request comment, the
//! CI job summary, and the commit-status description. Rendering is pure; truncation
//! respects the platform's comment-size ceiling while keeping the summary table
//! intact.

use crate::client::models::{FileAnalysis, Severity};
use crate::scm::models::CommitState;
use crate::scm::COMMENT_MARKER;

/// Aggregate issue counts across a batch of analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IssueTotals {
    pub files: usize,
    pub files_with_issues: usize,
    pub errors: usize,
    pub warnings: usize,
    pub suggestions: usize,
}

impl IssueTotals {
    pub fn from_analyses(analyses: &[FileAnalysis]) -> Self {
        let mut totals = Self {
            files: analyses.len(),
            ..Self::default()
        };
        for analysis in analyses {
            if !analysis.issues.is_empty() {
                totals.files_with_issues += 1;
            }
            totals.errors += analysis.count_by_severity(Severity::Error);
            totals.warnings += analysis.count_by_severity(Severity::Warning);
            totals.suggestions += analysis.count_by_severity(Severity::Suggestion);
        }
        totals
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings + self.suggestions
    }
}

/// Summary table: one row per file plus a totals row.
pub fn render_summary(analyses: &[FileAnalysis]) -> String {
    let totals = IssueTotals::from_analyses(analyses);
    let mut out = String::new();

    out.push_str("## Style analysis\n\n");
    if analyses.is_empty() {
        out.push_str("No files were analyzed.\n");
        return out;
    }

    out.push_str(&format!(
        "**{}** issue(s) across **{}** of **{}** file(s).\n\n",
        totals.total_issues(),
        totals.files_with_issues,
        totals.files
    ));
    out.push_str("| File | Errors | Warnings | Suggestions |\n");
    out.push_str("| --- | ---: | ---: | ---: |\n");
    for analysis in analyses {
        out.push_str(&format!(
            "| `{}` | {} | {} | {} |\n",
            analysis.path,
            analysis.count_by_severity(Severity::Error),
            analysis.count_by_severity(Severity::Warning),
            analysis.count_by_severity(Severity::Suggestion),
        ));
    }
    out
}

/// Per-file issue listings. Clean files are skipped.
pub fn render_details(analyses: &[FileAnalysis]) -> String {
    let mut out = String::new();
    for analysis in analyses {
        if analysis.issues.is_empty() {
            continue;
        }
        out.push_str(&format!("\n### `{}`\n\n", analysis.path));
        for issue in &analysis.issues {
            out.push_str(&format!(
                "- **{}** `{}` {}:{} — {}\n",
                issue.severity, issue.rule, issue.line, issue.column, issue.message
            ));
        }
    }
    out
}

/// Full pull-request comment: marker, summary, details, truncated to `max_bytes`.
///
/// Truncation drops trailing detail content, never the marker or the summary
/// table, and appends a note so readers know content was cut.
pub fn render_comment(analyses: &[FileAnalysis], max_bytes: usize) -> String {
    const TRUNCATION_NOTE: &str = "\n_…report truncated; see the job summary for the full listing._\n";

    let mut body = format!("{COMMENT_MARKER}\n{}", render_summary(analyses));
    let details = render_details(analyses);

    if body.len() + details.len() <= max_bytes {
        body.push_str(&details);
        return body;
    }

    let budget = max_bytes
        .saturating_sub(body.len())
        .saturating_sub(TRUNCATION_NOTE.len());
    let mut cut = details.as_str();
    while cut.len() > budget {
        // Trim whole lines so the cut never lands mid-entry.
        match cut.rfind('\n') {
            Some(pos) => cut = &cut[..pos],
            None => {
                cut = "";
                break;
            }
        }
    }
    body.push_str(cut);
    body.push_str(TRUNCATION_NOTE);
    body
}

/// Commit-status state and description for a finished batch.
pub fn commit_status(analyses: &[FileAnalysis]) -> (CommitState, String) {
    let totals = IssueTotals::from_analyses(analyses);
    if totals.errors > 0 {
        (
            CommitState::Failure,
            format!(
                "{} error(s), {} warning(s) in {} file(s)",
                totals.errors, totals.warnings, totals.files
            ),
        )
    } else {
        (
            CommitState::Success,
            format!(
                "{} issue(s) in {} file(s)",
                totals.total_issues(),
                totals.files
            ),
        )
    }
}
