//! Report exporter: final document generation.

use tracing::info;

use docbind_backend::ReportBackend;

use crate::error::{PipelineError, Result};
use crate::session::ReportSession;

/// Filename defaults for exported documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    pub default_filename: String,
    /// Extension without the leading dot.
    pub extension: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            default_filename: "weekly_report.docx".to_string(),
            extension: "docx".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Resolves the name an exported document is saved under.
///
/// Directory components are dropped, an empty name falls back to the
/// default, and the extension is appended unless already present (compared
/// case-insensitively).
pub fn normalize_filename(requested: Option<&str>, options: &ExportOptions) -> String {
    let base = requested
        .map(|name| name.trim().rsplit(['/', '\\']).next().unwrap_or("").trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(options.default_filename.as_str());

    let suffix = format!(".{}", options.extension.trim_start_matches('.'));
    if base.to_lowercase().ends_with(&suffix.to_lowercase()) {
        base.to_string()
    } else {
        format!("{base}{suffix}")
    }
}

/// Asks the backend for the final document.
///
/// Requires a successful filter: without a working dataset there is
/// nothing to export.
pub fn run<B: ReportBackend>(
    session: &ReportSession,
    backend: &B,
    requested: Option<&str>,
    options: &ExportOptions,
) -> Result<ExportedDocument> {
    let Some(dataset) = session.dataset() else {
        return Err(PipelineError::Precondition(
            "no filtered data to export; submit a date range first".to_string(),
        ));
    };
    let filename = normalize_filename(requested, options);
    let bytes = backend.export_document(session.store().as_map(), dataset, &filename)?;
    info!(%filename, bytes = bytes.len(), "document exported");
    Ok(ExportedDocument { filename, bytes })
}
