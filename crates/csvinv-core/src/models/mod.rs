//! Data models shared by the service, the adapter and the CLI.

pub mod config;
pub mod file;
pub mod invoice;
pub mod options;

pub use config::CsvInvConfig;
pub use file::{FileId, FileInfo, FileStatus, ProcessResult, ProcessingStats};
pub use invoice::{Invoice, InvoiceHeader, InvoiceSummary, LineItem, Party, VatRate};
pub use options::{ParseOptions, ProgressCallback};
