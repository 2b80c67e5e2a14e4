//! # File Discovery
//!
//! Local collection of documents to analyze: walk the given paths, keep files with
//! analyzable text extensions, skip hidden entries, and return sorted relative
//! paths so batches are deterministic run to run.

use crate::error::{Result, StyleguardError};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Extensions treated as prose documents by default.
pub const DEFAULT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "rst", "adoc"];

/// Walk `roots` and collect analyzable files.
///
/// Explicitly named files are always kept regardless of extension; directory
/// walks filter by `extensions`.
pub fn discover_files(roots: &[String], extensions: &[String]) -> Result<Vec<String>> {
    let mut found = Vec::new();

    for root in roots {
        let path = Path::new(root);
        if path.is_file() {
            found.push(root.clone());
            continue;
        }
        if !path.exists() {
            return Err(StyleguardError::Io {
                path: root.clone(),
                message: "no such file or directory".to_string(),
            });
        }

        for entry in WalkDir::new(path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()))
        {
            let entry = entry.map_err(|e| StyleguardError::Io {
                path: root.clone(),
                message: e.to_string(),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            if has_extension(entry.path(), extensions) {
                found.push(entry.path().to_string_lossy().into_owned());
            }
        }
    }

    found.sort();
    found.dedup();
    debug!(count = found.len(), "Discovered files for analysis");
    Ok(found)
}

/// Read one document as UTF-8.
pub fn read_document(path: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| StyleguardError::Io {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// True when `path` carries one of the allowed extensions (case-insensitive).
pub fn has_allowed_extension(path: &str, extensions: &[String]) -> bool {
    has_extension(Path::new(path), extensions)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.') && name.len() > 1)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
}
