//! Core library for CSV invoice ingestion.
//!
//! This crate provides:
//! - Invoice data models and Polish field parsers (amounts, NIP, dates, VAT)
//! - CSV-to-invoice ingestion with row-level error collection
//! - A processing service that tracks files and statistics
//! - A progress-reporting adapter that exposes service progress to a UI

pub mod adapter;
pub mod error;
pub mod ingest;
pub mod models;
pub mod rules;
pub mod service;

pub use adapter::{AdapterState, ProgressAdapter};
pub use error::{CsvInvError, Result, RowError};
pub use models::config::CsvInvConfig;
pub use models::file::{FileId, FileInfo, FileStatus, ProcessResult, ProcessingStats};
pub use models::invoice::{Invoice, InvoiceHeader, InvoiceSummary, LineItem, Party, VatRate};
pub use models::options::{ParseOptions, ProgressCallback};
pub use service::{CsvProcessingService, CsvProcessor};

pub use rust_decimal::Decimal;
