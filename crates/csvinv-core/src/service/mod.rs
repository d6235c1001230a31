//! The CSV processing service: the collaborator the adapter wraps.

mod processor;
mod registry;

pub use processor::CsvProcessor;
pub use registry::FileRegistry;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::file::{FileId, ProcessResult, ProcessingStats};
use crate::models::options::ParseOptions;

/// Turns CSV files into invoices and keeps track of what it has seen.
#[async_trait]
pub trait CsvProcessingService: Send + Sync {
    /// Process one file, reporting progress through `options.on_progress`.
    async fn process_file(&self, file: &Path, options: &ParseOptions) -> Result<ProcessResult>;

    /// Process several files, reporting overall progress.
    async fn process_files(
        &self,
        files: &[PathBuf],
        options: &ParseOptions,
    ) -> Result<Vec<ProcessResult>>;

    /// Forget a file. Unknown ids are ignored.
    fn remove_file(&self, id: &FileId);

    /// Counters over all files currently known.
    fn processing_stats(&self) -> ProcessingStats;
}
