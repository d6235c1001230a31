//! Error types for the csvinv-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the csvinv library.
#[derive(Error, Debug)]
pub enum CsvInvError {
    /// I/O error while reading an input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error (malformed quoting, unreadable header, ...).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The input is not valid UTF-8.
    #[error("{path} is not valid UTF-8")]
    Encoding { path: PathBuf },

    /// The input has no data rows.
    #[error("{path} contains no data rows")]
    EmptyFile { path: PathBuf },

    /// The header row lacks required columns.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A problem with a single data row. The row is skipped and processing
/// continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("row {row}: {reason}")]
pub struct RowError {
    /// 1-based line number in the source file (header counts as line 1).
    pub row: u64,
    /// Human-readable description.
    pub reason: String,
}

impl RowError {
    pub fn new(row: u64, reason: impl Into<String>) -> Self {
        Self {
            row,
            reason: reason.into(),
        }
    }
}

/// Result type for the csvinv library.
pub type Result<T> = std::result::Result<T, CsvInvError>;
