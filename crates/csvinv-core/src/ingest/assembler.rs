//! Groups parsed rows into invoices by invoice number.

use std::collections::HashMap;

use super::row::ParsedRow;
use crate::error::RowError;
use crate::models::invoice::Invoice;

/// Collects rows and merges those sharing an invoice number, keeping
/// invoices in first-appearance order.
#[derive(Debug, Default)]
pub struct InvoiceAssembler {
    file_name: String,
    invoices: Vec<Invoice>,
    index: HashMap<String, usize>,
}

impl InvoiceAssembler {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            ..Self::default()
        }
    }

    /// Add a row, opening a new invoice or extending an existing one.
    ///
    /// A row whose amounts would overflow the invoice totals is rejected and
    /// leaves the invoice as it was.
    pub fn push(&mut self, row: ParsedRow) -> Result<(), RowError> {
        match self.index.get(&row.invoice_number) {
            Some(&idx) => {
                let invoice = &mut self.invoices[idx];
                let warnings = conflicts(invoice, &row);
                append_item(invoice, row)?;
                invoice.source.warnings.extend(warnings);
            }
            None => {
                let mut invoice = Invoice::new(row.invoice_number.clone(), row.issue_date);
                invoice.header.sale_date = row.sale_date;
                invoice.header.due_date = row.due_date;
                invoice.header.currency = row.currency.clone();
                invoice.issuer = row.issuer.clone();
                invoice.receiver = row.receiver.clone();
                invoice.source.file_name = self.file_name.clone();

                let number = row.invoice_number.clone();
                append_item(&mut invoice, row)?;
                self.index.insert(number, self.invoices.len());
                self.invoices.push(invoice);
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    /// Return the invoices; totals are kept current by [`push`](Self::push).
    pub fn finish(self) -> Vec<Invoice> {
        self.invoices
    }
}

fn append_item(invoice: &mut Invoice, row: ParsedRow) -> Result<(), RowError> {
    if !invoice.push_line_item(row.item) {
        return Err(RowError::new(
            row.line,
            format!(
                "amount out of range in totals of invoice {}",
                invoice.header.invoice_number
            ),
        ));
    }
    invoice.source.rows.push(row.line);
    Ok(())
}

/// Header fields must agree across rows of one invoice; the first row wins.
fn conflicts(invoice: &Invoice, row: &ParsedRow) -> Vec<String> {
    let mut conflicts = Vec::new();

    if invoice.header.issue_date != row.issue_date {
        conflicts.push(("issue_date", row.issue_date.to_string()));
    }
    if invoice.header.currency != row.currency {
        conflicts.push(("currency", row.currency.clone()));
    }
    if invoice.issuer.name != row.issuer.name {
        conflicts.push(("issuer_name", row.issuer.name.clone()));
    }
    if row.issuer.nip.is_some() && invoice.issuer.nip != row.issuer.nip {
        conflicts.push(("issuer_nip", row.issuer.nip.clone().unwrap_or_default()));
    }

    conflicts
        .into_iter()
        .map(|(field, value)| {
            format!(
                "row {}: {} '{}' conflicts with earlier rows, ignored",
                row.line, field, value
            )
        })
        .collect()
}
