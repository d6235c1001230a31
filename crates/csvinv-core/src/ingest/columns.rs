//! Header resolution: maps known invoice columns to record positions.

use std::collections::HashMap;

use csv::StringRecord;

use crate::error::{CsvInvError, Result};

/// A column the ingester understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    InvoiceNumber,
    IssueDate,
    SaleDate,
    DueDate,
    IssuerName,
    IssuerNip,
    ReceiverName,
    ReceiverNip,
    Description,
    Quantity,
    Unit,
    UnitPriceNet,
    VatRate,
    TotalNet,
    TotalVat,
    TotalGross,
    Currency,
}

impl Column {
    /// All columns in canonical order. Headerless files use this order.
    pub const ALL: [Column; 17] = [
        Column::InvoiceNumber,
        Column::IssueDate,
        Column::SaleDate,
        Column::DueDate,
        Column::IssuerName,
        Column::IssuerNip,
        Column::ReceiverName,
        Column::ReceiverNip,
        Column::Description,
        Column::Quantity,
        Column::Unit,
        Column::UnitPriceNet,
        Column::VatRate,
        Column::TotalNet,
        Column::TotalVat,
        Column::TotalGross,
        Column::Currency,
    ];

    /// Canonical header name.
    pub fn name(&self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted header names after normalization; the first is canonical.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::InvoiceNumber => &["invoice_number", "invoice_no", "numer_faktury", "nr_faktury"],
            Column::IssueDate => &["issue_date", "date", "data_wystawienia"],
            Column::SaleDate => &["sale_date", "data_sprzedazy", "data_sprzedaży"],
            Column::DueDate => &["due_date", "termin_platnosci", "termin_płatności"],
            Column::IssuerName => &["issuer_name", "seller", "seller_name", "sprzedawca"],
            Column::IssuerNip => &["issuer_nip", "seller_nip", "nip_sprzedawcy"],
            Column::ReceiverName => &["receiver_name", "buyer", "buyer_name", "nabywca"],
            Column::ReceiverNip => &["receiver_nip", "buyer_nip", "nip_nabywcy"],
            Column::Description => &["description", "item", "nazwa", "opis"],
            Column::Quantity => &["quantity", "qty", "ilosc", "ilość"],
            Column::Unit => &["unit", "jm", "j.m."],
            Column::UnitPriceNet => &["unit_price_net", "unit_price", "cena_netto"],
            Column::VatRate => &["vat_rate", "stawka_vat", "vat"],
            Column::TotalNet => &["total_net", "net", "wartosc_netto", "wartość_netto"],
            Column::TotalVat => &["total_vat", "vat_amount", "kwota_vat"],
            Column::TotalGross => &["total_gross", "gross", "wartosc_brutto", "wartość_brutto"],
            Column::Currency => &["currency", "waluta"],
        }
    }

    /// Whether a file must provide this column.
    pub fn is_required(&self) -> bool {
        matches!(
            self,
            Column::InvoiceNumber | Column::IssueDate | Column::IssuerName | Column::Description
        )
    }

    fn from_header(header: &str) -> Option<Column> {
        let normalized = normalize_header(header);
        Column::ALL
            .into_iter()
            .find(|c| c.aliases().contains(&normalized.as_str()))
    }
}

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Positions of known columns within a record.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    indices: HashMap<Column, usize>,
}

impl ColumnMap {
    /// Resolve columns from a header row. Unknown headers are ignored; the
    /// first occurrence of a column wins.
    pub fn from_headers(headers: &StringRecord) -> Result<Self> {
        let mut indices = HashMap::new();

        for (idx, header) in headers.iter().enumerate() {
            if let Some(column) = Column::from_header(header) {
                indices.entry(column).or_insert(idx);
            }
        }

        let map = Self { indices };
        let missing: Vec<String> = Column::ALL
            .iter()
            .filter(|c| c.is_required() && !map.contains(**c))
            .map(|c| c.name().to_string())
            .collect();

        if !missing.is_empty() {
            return Err(CsvInvError::MissingColumns(missing));
        }

        Ok(map)
    }

    /// Canonical positional layout for headerless files.
    pub fn positional() -> Self {
        Self {
            indices: Column::ALL
                .iter()
                .enumerate()
                .map(|(idx, column)| (*column, idx))
                .collect(),
        }
    }

    pub fn contains(&self, column: Column) -> bool {
        self.indices.contains_key(&column)
    }

    /// Trimmed, non-empty cell value for `column`.
    pub fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        let idx = *self.indices.get(&column)?;
        record
            .get(idx)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}
