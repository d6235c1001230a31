//! Per-call parsing options, including the progress callback.

use std::fmt;
use std::sync::Arc;

/// Progress observer: receives a percentage (0-100) and a status message.
pub type ProgressCallback = Arc<dyn Fn(u8, &str) + Send + Sync>;

/// Options for a single `process_file`/`process_files` call.
#[derive(Clone)]
pub struct ParseOptions {
    /// Field delimiter.
    pub delimiter: u8,

    /// Whether the first row is a header row.
    pub has_headers: bool,

    /// Trim whitespace around fields.
    pub trim: bool,

    /// Accept rows with a differing number of fields.
    pub flexible: bool,

    /// Stop after this many data rows (0 = unlimited).
    pub max_rows: usize,

    /// Reject rows whose NIP fails the checksum.
    pub validate_nip: bool,

    /// Currency used when a row has none.
    pub default_currency: String,

    /// Report row progress every this many rows.
    pub progress_interval: usize,

    /// In a batch, go on to the next file after one fails.
    pub continue_on_error: bool,

    /// Optional progress observer.
    pub on_progress: Option<ProgressCallback>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_headers: true,
            trim: true,
            flexible: false,
            max_rows: 0,
            validate_nip: true,
            default_currency: "PLN".to_string(),
            progress_interval: 100,
            continue_on_error: true,
            on_progress: None,
        }
    }
}

impl ParseOptions {
    /// Attach a progress observer, replacing any existing one.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(u8, &str) + Send + Sync + 'static,
    {
        self.on_progress = Some(Arc::new(callback));
        self
    }

    /// Invoke the progress observer, if any.
    pub fn report(&self, progress: u8, message: &str) {
        if let Some(callback) = &self.on_progress {
            callback(progress.min(100), message);
        }
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("delimiter", &(self.delimiter as char))
            .field("has_headers", &self.has_headers)
            .field("trim", &self.trim)
            .field("flexible", &self.flexible)
            .field("max_rows", &self.max_rows)
            .field("validate_nip", &self.validate_nip)
            .field("default_currency", &self.default_currency)
            .field("progress_interval", &self.progress_interval)
            .field("continue_on_error", &self.continue_on_error)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}
