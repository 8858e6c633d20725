//! Loading raw report texts from disk.

use std::path::Path;

use tracing::debug;

use crate::error::LoadError;

/// Separator line between reports in a multi-report file.
pub const REPORT_SEPARATOR: &str = "---";

/// Split a multi-report document into trimmed, non-empty report texts.
#[must_use]
pub fn split_reports(content: &str) -> Vec<String> {
    content
        .split(REPORT_SEPARATOR)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Read `path` and split it into report texts.
pub fn load_reports_from_file(path: impl AsRef<Path>) -> Result<Vec<String>, LoadError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let reports = split_reports(&content);
    debug!("Loaded {} reports from {}", reports.len(), path.display());
    Ok(reports)
}
