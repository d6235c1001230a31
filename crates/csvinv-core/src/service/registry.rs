//! Bookkeeping of files known to a processor.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::models::file::{FileId, FileInfo, FileStatus, ProcessingStats};

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    files: Vec<FileInfo>,
}

/// Thread-safe list of files in registration order.
#[derive(Debug, Default)]
pub struct FileRegistry {
    inner: Mutex<Inner>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `path` under a fresh id with status `Processing`.
    pub fn register(&self, path: &Path) -> FileInfo {
        let mut inner = self.lock();
        inner.next_id += 1;

        let mut info = FileInfo::pending(FileId::new(format!("file-{}", inner.next_id)), path);
        info.status = FileStatus::Processing;
        inner.files.push(info.clone());
        info
    }

    /// Replace the stored entry with the same id. Returns false if the entry
    /// was removed in the meantime.
    pub fn update(&self, info: &FileInfo) -> bool {
        let mut inner = self.lock();
        match inner.files.iter_mut().find(|f| f.id == info.id) {
            Some(entry) => {
                *entry = info.clone();
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &FileId) -> Option<FileInfo> {
        let mut inner = self.lock();
        let idx = inner.files.iter().position(|f| &f.id == id)?;
        Some(inner.files.remove(idx))
    }

    pub fn get(&self, id: &FileId) -> Option<FileInfo> {
        self.lock().files.iter().find(|f| &f.id == id).cloned()
    }

    pub fn files(&self) -> Vec<FileInfo> {
        self.lock().files.clone()
    }

    pub fn stats(&self) -> ProcessingStats {
        let inner = self.lock();
        let count = |status: FileStatus| inner.files.iter().filter(|f| f.status == status).count();

        ProcessingStats {
            total_files: inner.files.len(),
            completed_files: count(FileStatus::Completed),
            error_files: count(FileStatus::Error),
            processing_files: count(FileStatus::Processing),
            total_invoices: inner.files.iter().map(|f| f.invoice_count).sum(),
        }
    }
}
