//! Per-file bookkeeping: identifiers, status, results and statistics.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invoice::Invoice;

/// Identifier assigned to a file when the service first sees it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileId(String);

impl FileId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Lifecycle of a file inside the processing service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Error,
}

/// Metadata about a processed file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Service-assigned identifier.
    pub id: FileId,

    /// File name without directories.
    pub name: String,

    /// Full path as given to the service.
    pub path: PathBuf,

    /// Size on disk (0 if the file could not be read).
    pub size_bytes: u64,

    /// Current status.
    pub status: FileStatus,

    /// Number of data rows read (header excluded).
    pub row_count: usize,

    /// Number of invoices assembled from the rows.
    pub invoice_count: usize,

    /// When processing finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_at: Option<DateTime<Utc>>,
}

impl FileInfo {
    /// Create metadata for a file that has not been processed yet.
    pub fn pending(id: FileId, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            id,
            name,
            path,
            size_bytes: 0,
            status: FileStatus::Pending,
            row_count: 0,
            invoice_count: 0,
            processed_at: None,
        }
    }
}

/// Outcome of processing one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Whether the file was processed without any reported errors.
    pub success: bool,

    /// File metadata.
    pub file_info: FileInfo,

    /// Invoices parsed from the file.
    pub invoices: Vec<Invoice>,

    /// Error messages, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ProcessResult {
    /// A result for a file that could not be processed at all.
    pub fn failed(file_info: FileInfo, error: impl Into<String>) -> Self {
        Self {
            success: false,
            file_info,
            invoices: Vec::new(),
            errors: vec![error.into()],
        }
    }
}

/// Aggregate counters over all files known to the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingStats {
    pub total_files: usize,
    pub completed_files: usize,
    pub error_files: usize,
    pub processing_files: usize,
    pub total_invoices: usize,
}
