//! Rendering of parsed invoices.

use csvinv_core::Invoice;
use csvinv_core::rules::{format_nip, format_polish_amount};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per invoice
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_invoices(invoices: &[Invoice], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(invoices)?),
        OutputFormat::Csv => format_csv(invoices),
        OutputFormat::Text => Ok(format_text(invoices)),
    }
}

fn format_csv(invoices: &[Invoice]) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_number",
        "issue_date",
        "due_date",
        "issuer_name",
        "issuer_nip",
        "receiver_name",
        "receiver_nip",
        "line_items",
        "total_net",
        "total_vat",
        "total_gross",
        "currency",
    ])?;

    for invoice in invoices {
        wtr.write_record([
            &invoice.header.invoice_number,
            &invoice.header.issue_date.to_string(),
            &invoice.header.due_date.map(|d| d.to_string()).unwrap_or_default(),
            &invoice.issuer.name,
            &invoice.issuer.nip.clone().unwrap_or_default(),
            &invoice.receiver.name,
            &invoice.receiver.nip.clone().unwrap_or_default(),
            &invoice.line_items.len().to_string(),
            &invoice.summary.total_net.to_string(),
            &invoice.summary.total_vat.to_string(),
            &invoice.summary.total_gross.to_string(),
            &invoice.header.currency,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(invoices: &[Invoice]) -> String {
    let mut output = String::new();

    for (i, invoice) in invoices.iter().enumerate() {
        if i > 0 {
            output.push_str("\n----------------------------------------\n\n");
        }

        let currency = &invoice.header.currency;
        output.push_str(&format!("Invoice: {}\n", invoice.header.invoice_number));
        output.push_str(&format!("Date: {}\n", invoice.header.issue_date));
        if let Some(due_date) = invoice.header.due_date {
            output.push_str(&format!("Payment due: {}\n", due_date));
        }
        output.push('\n');

        output.push_str(&format!("Issuer: {}\n", invoice.issuer.name));
        if let Some(nip) = &invoice.issuer.nip {
            output.push_str(&format!("  NIP: {}\n", format_nip(nip)));
        }
        if !invoice.receiver.name.is_empty() {
            output.push_str(&format!("Receiver: {}\n", invoice.receiver.name));
        }
        if let Some(nip) = &invoice.receiver.nip {
            output.push_str(&format!("  NIP: {}\n", format_nip(nip)));
        }
        output.push('\n');

        for item in &invoice.line_items {
            output.push_str(&format!(
                "  {:>2}. {} x {} @ {} ({}) = {} {}\n",
                item.ordinal,
                item.description,
                item.quantity,
                format_polish_amount(item.unit_price_net),
                item.vat_rate.display(),
                format_polish_amount(item.total_gross),
                currency
            ));
        }
        output.push('\n');

        output.push_str(&format!("  Net:   {} {}\n", format_polish_amount(invoice.summary.total_net), currency));
        output.push_str(&format!("  VAT:   {} {}\n", format_polish_amount(invoice.summary.total_vat), currency));
        output.push_str(&format!("  Gross: {} {}\n", format_polish_amount(invoice.summary.total_gross), currency));

        for warning in &invoice.source.warnings {
            output.push_str(&format!("  ! {}\n", warning));
        }
    }

    output
}
