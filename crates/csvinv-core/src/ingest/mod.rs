//! CSV-to-invoice ingestion.
//!
//! Reads CSV content, resolves the column layout, parses each record into a
//! line item and groups the lines into invoices. Row-level problems are
//! collected rather than aborting the file.

mod assembler;
mod columns;
mod row;

pub use assembler::InvoiceAssembler;
pub use columns::{Column, ColumnMap};
pub use row::{ParsedRow, RowParser};

use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, warn};

use crate::error::{CsvInvError, Result, RowError};
use crate::models::invoice::Invoice;
use crate::models::options::ParseOptions;

/// Everything learned from one file.
#[derive(Debug, Clone, Default)]
pub struct IngestOutcome {
    /// Invoices in first-appearance order.
    pub invoices: Vec<Invoice>,
    /// Data rows read, including the ones that failed.
    pub row_count: usize,
    /// Row-level problems, ordered by line.
    pub errors: Vec<RowError>,
}

/// Parse invoices from CSV `content` read from `path`.
///
/// `on_row(done, total)` is called after every data row.
pub fn parse_invoices<F>(
    content: &str,
    path: &Path,
    options: &ParseOptions,
    mut on_row: F,
) -> Result<IngestOutcome>
where
    F: FnMut(usize, usize),
{
    if content.trim().is_empty() {
        return Err(CsvInvError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(options.flexible)
        .trim(if options.trim { Trim::All } else { Trim::None })
        .from_reader(content.as_bytes());

    let columns = if options.has_headers {
        ColumnMap::from_headers(reader.headers()?)?
    } else {
        ColumnMap::positional()
    };

    let mut records: Vec<(u64, StringRecord)> = Vec::new();
    let mut errors = Vec::new();

    for result in reader.records() {
        if options.max_rows > 0 && records.len() + errors.len() >= options.max_rows {
            debug!("Stopping at max_rows = {}", options.max_rows);
            break;
        }

        match result {
            Ok(record) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                records.push((line, record));
            }
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or_default();
                errors.push(RowError::new(line, e.to_string()));
            }
        }
    }

    let row_count = records.len() + errors.len();
    if row_count == 0 {
        return Err(CsvInvError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let parser = RowParser::new(&columns, options.validate_nip, &options.default_currency);
    let mut assembler = InvoiceAssembler::new(file_name);
    let total = records.len();

    for (i, (line, record)) in records.iter().enumerate() {
        match parser.parse(record, *line).and_then(|row| assembler.push(row)) {
            Ok(()) => {}
            Err(e) => {
                warn!("{}: {}", file_name, e);
                errors.push(e);
            }
        }
        on_row(i + 1, total);
    }

    errors.sort_by_key(|e| e.row);

    debug!(
        "{}: {} rows, {} invoices, {} row errors",
        file_name,
        row_count,
        assembler.len(),
        errors.len()
    );

    Ok(IngestOutcome {
        invoices: assembler.finish(),
        row_count,
        errors,
    })
}
