//! Default in-process implementation of the CSV processing service.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use super::registry::FileRegistry;
use super::CsvProcessingService;
use crate::error::{CsvInvError, Result};
use crate::ingest;
use crate::models::file::{FileId, FileInfo, FileStatus, ProcessResult, ProcessingStats};
use crate::models::options::{ParseOptions, ProgressCallback};

/// Reads CSV files from disk and keeps a registry of processed files.
#[derive(Debug, Default)]
pub struct CsvProcessor {
    registry: FileRegistry,
}

impl CsvProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every known file, in registration order.
    pub fn files(&self) -> Vec<FileInfo> {
        self.registry.files()
    }

    pub fn file(&self, id: &FileId) -> Option<FileInfo> {
        self.registry.get(id)
    }

    /// Process `path`, always returning the final file info alongside the
    /// outcome so batch callers can report failures.
    async fn process_tracked(
        &self,
        path: &Path,
        options: &ParseOptions,
    ) -> (FileInfo, Result<ProcessResult>) {
        let mut info = self.registry.register(path);
        debug!("Processing {} as {}", path.display(), info.id);

        let outcome = self.run(path, options, &mut info).await;
        info.processed_at = Some(Utc::now());

        let result = match outcome {
            Ok(mut result) => {
                info.status = if result.success {
                    FileStatus::Completed
                } else {
                    FileStatus::Error
                };
                result.file_info = info.clone();
                Ok(result)
            }
            Err(e) => {
                info.status = FileStatus::Error;
                Err(e)
            }
        };

        if !self.registry.update(&info) {
            debug!("{} was removed while processing", info.id);
        }

        (info, result)
    }

    async fn run(
        &self,
        path: &Path,
        options: &ParseOptions,
        info: &mut FileInfo,
    ) -> Result<ProcessResult> {
        options.report(10, "reading file");
        let bytes = tokio::fs::read(path).await?;
        info.size_bytes = bytes.len() as u64;

        let content = String::from_utf8(bytes).map_err(|_| CsvInvError::Encoding {
            path: path.to_path_buf(),
        })?;

        options.report(30, "parsing rows");
        let interval = options.progress_interval.max(1);
        let outcome = ingest::parse_invoices(&content, path, options, |done, total| {
            if done % interval == 0 || done == total {
                let progress = 30 + (done * 60 / total.max(1)) as u8;
                options.report(progress, &format!("parsing rows ({}/{})", done, total));
            }
        })?;

        options.report(90, "building invoices");
        info.row_count = outcome.row_count;
        info.invoice_count = outcome.invoices.len();

        let errors: Vec<String> = outcome.errors.iter().map(ToString::to_string).collect();
        if errors.is_empty() {
            info!(
                "{}: {} invoices from {} rows",
                info.name, info.invoice_count, info.row_count
            );
        } else {
            warn!(
                "{}: {} invoices from {} rows, {} rows rejected",
                info.name,
                info.invoice_count,
                info.row_count,
                errors.len()
            );
        }

        options.report(100, "done");

        Ok(ProcessResult {
            success: errors.is_empty(),
            file_info: info.clone(),
            invoices: outcome.invoices,
            errors,
        })
    }
}

/// Rescale a per-file callback into the overall batch range.
fn batch_progress(
    callback: &ProgressCallback,
    index: usize,
    total: usize,
    name: String,
) -> ProgressCallback {
    let callback = Arc::clone(callback);
    Arc::new(move |progress: u8, message: &str| {
        let overall = (index * 100 + progress as usize) / total;
        callback(
            overall.min(100) as u8,
            &format!("[{}/{}] {}: {}", index + 1, total, name, message),
        );
    })
}

#[async_trait]
impl CsvProcessingService for CsvProcessor {
    async fn process_file(&self, file: &Path, options: &ParseOptions) -> Result<ProcessResult> {
        let (_, result) = self.process_tracked(file, options).await;
        result
    }

    async fn process_files(
        &self,
        files: &[PathBuf],
        options: &ParseOptions,
    ) -> Result<Vec<ProcessResult>> {
        let total = files.len();
        let mut results = Vec::with_capacity(total);

        for (index, file) in files.iter().enumerate() {
            let name = file
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            let mut file_options = options.clone();
            file_options.on_progress = options
                .on_progress
                .as_ref()
                .map(|cb| batch_progress(cb, index, total, name));

            let (info, result) = self.process_tracked(file, &file_options).await;
            let result = result.unwrap_or_else(|e| {
                warn!("Failed to process {}: {}", file.display(), e);
                ProcessResult::failed(info, e.to_string())
            });
            let failed = !result.success;
            results.push(result);

            if failed && !options.continue_on_error {
                info!("Stopping batch after {} of {} files", index + 1, total);
                break;
            }
        }

        Ok(results)
    }

    fn remove_file(&self, id: &FileId) {
        if self.registry.remove(id).is_none() {
            debug!("remove_file: unknown id {}", id);
        }
    }

    fn processing_stats(&self) -> ProcessingStats {
        self.registry.stats()
    }
}
