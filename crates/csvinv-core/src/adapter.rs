//! Progress-reporting adapter over a [`CsvProcessingService`].
//!
//! The adapter owns three pieces of UI-facing state (busy flag, percentage,
//! status message) and keeps them current while delegating the actual work
//! to the service. Every call settles the state to a terminal value, whether
//! the service succeeds, fails, or the call is dropped mid-flight.
//!
//! Overlapping calls on one adapter share the same state and overwrite each
//! other's progress; the last call to settle wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::debug;

use crate::error::Result;
use crate::models::file::{FileId, ProcessResult, ProcessingStats};
use crate::models::options::ParseOptions;
use crate::service::CsvProcessingService;

/// Message set when a single-file call starts.
pub const PREPARING: &str = "preparing";
/// Message set when a single-file call settles.
pub const DONE: &str = "done";
/// Message set when a batch call starts.
pub const PREPARING_BATCH: &str = "preparing multiple files";
/// Message set when a batch call settles.
pub const BATCH_DONE: &str = "all files done";

/// UI-observable progress state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdapterState {
    pub is_processing: bool,
    /// Percentage, 0-100.
    pub progress: u8,
    pub message: String,
}

impl AdapterState {
    fn busy(message: &str) -> Self {
        Self {
            is_processing: true,
            progress: 0,
            message: message.to_string(),
        }
    }

    fn settled(message: &str) -> Self {
        Self {
            is_processing: false,
            progress: 100,
            message: message.to_string(),
        }
    }
}

/// Sets the terminal state when dropped.
struct Settle<'a> {
    state: &'a watch::Sender<AdapterState>,
    message: &'static str,
}

impl Drop for Settle<'_> {
    fn drop(&mut self) {
        self.state.send_replace(AdapterState::settled(self.message));
    }
}

/// Wraps a processing service and mirrors its progress into [`AdapterState`].
pub struct ProgressAdapter<S> {
    service: S,
    defaults: ParseOptions,
    state: Arc<watch::Sender<AdapterState>>,
}

impl<S: CsvProcessingService> ProgressAdapter<S> {
    /// Create an adapter with default parse options.
    pub fn new(service: S) -> Self {
        Self::with_defaults(service, ParseOptions::default())
    }

    /// Create an adapter whose calls fall back to `defaults` when no options
    /// are passed.
    pub fn with_defaults(service: S, defaults: ParseOptions) -> Self {
        let (state, _) = watch::channel(AdapterState::default());
        Self {
            service,
            defaults,
            state: Arc::new(state),
        }
    }

    /// Process one file through the service.
    ///
    /// Errors from the service are returned unchanged.
    pub async fn process_file(
        &self,
        file: &Path,
        options: Option<ParseOptions>,
    ) -> Result<ProcessResult> {
        let options = self.observe(options);
        let _settle = self.begin(PREPARING, DONE);
        debug!("Adapter: processing {}", file.display());

        self.service.process_file(file, &options).await
    }

    /// Process several files through the service.
    ///
    /// Errors from the service are returned unchanged.
    pub async fn process_files(
        &self,
        files: &[PathBuf],
        options: Option<ParseOptions>,
    ) -> Result<Vec<ProcessResult>> {
        let options = self.observe(options);
        let _settle = self.begin(PREPARING_BATCH, BATCH_DONE);
        debug!("Adapter: processing {} files", files.len());

        self.service.process_files(files, &options).await
    }

    /// Forget a file in the service. Adapter state is untouched.
    pub fn remove_file(&self, id: &FileId) {
        self.service.remove_file(id);
    }

    /// The service's statistics, as reported.
    pub fn stats(&self) -> ProcessingStats {
        self.service.processing_stats()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AdapterState {
        self.state.borrow().clone()
    }

    pub fn is_processing(&self) -> bool {
        self.state.borrow().is_processing
    }

    pub fn progress(&self) -> u8 {
        self.state.borrow().progress
    }

    pub fn progress_message(&self) -> String {
        self.state.borrow().message.clone()
    }

    /// Follow state changes. Any number of receivers may be active.
    pub fn subscribe(&self) -> watch::Receiver<AdapterState> {
        self.state.subscribe()
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    fn begin(&self, start: &str, end: &'static str) -> Settle<'_> {
        self.state.send_replace(AdapterState::busy(start));
        Settle {
            state: self.state.as_ref(),
            message: end,
        }
    }

    /// Chain a state update in front of the caller's progress callback.
    fn observe(&self, options: Option<ParseOptions>) -> ParseOptions {
        let options = options.unwrap_or_else(|| self.defaults.clone());
        let state = Arc::clone(&self.state);
        let downstream = options.on_progress.clone();

        ParseOptions {
            on_progress: Some(Arc::new(move |progress: u8, message: &str| {
                let progress = progress.min(100);
                state.send_modify(|s| {
                    s.progress = progress;
                    s.message = message.to_string();
                });
                if let Some(callback) = &downstream {
                    callback(progress, message);
                }
            })),
            ..options
        }
    }
}
