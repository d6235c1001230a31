//! Invoice data models built from CSV rows.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A complete invoice assembled from one or more CSV rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice header information.
    pub header: InvoiceHeader,

    /// Issuer (seller) information.
    pub issuer: Party,

    /// Receiver (buyer) information.
    pub receiver: Party,

    /// Line items on the invoice, in source row order.
    pub line_items: Vec<LineItem>,

    /// Invoice summary with totals.
    pub summary: InvoiceSummary,

    /// Where the invoice came from.
    pub source: SourceMetadata,
}

/// Invoice header with basic information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceHeader {
    /// Invoice number/identifier.
    pub invoice_number: String,

    /// Date the invoice was issued.
    pub issue_date: NaiveDate,

    /// Date of sale/service (may differ from issue date).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sale_date: Option<NaiveDate>,

    /// Payment due date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,

    /// Currency code (default: PLN).
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "PLN".to_string()
}

/// A party (seller or buyer) on the invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Party {
    /// Full legal name.
    pub name: String,

    /// Polish tax identification number (NIP), digits only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nip: Option<String>,
}

/// A single line item on the invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Position on the invoice, starting at 1.
    pub ordinal: u32,

    /// Product/service description.
    pub description: String,

    /// Quantity.
    pub quantity: Decimal,

    /// Unit of measure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,

    /// Unit price (net, before VAT).
    pub unit_price_net: Decimal,

    /// Applicable VAT rate.
    pub vat_rate: VatRate,

    /// Total net amount for this line.
    pub total_net: Decimal,

    /// VAT amount for this line.
    pub vat_amount: Decimal,

    /// Total gross amount for this line.
    pub total_gross: Decimal,
}

/// Polish VAT rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VatRate {
    /// Standard rate: 23%
    #[serde(rename = "23")]
    Standard23,

    /// Reduced rate: 8%
    #[serde(rename = "8")]
    Reduced8,

    /// Reduced rate: 5%
    #[serde(rename = "5")]
    Reduced5,

    /// Zero rate: 0%
    #[serde(rename = "0")]
    Zero,

    /// Exempt (zwolniony).
    #[serde(rename = "zw")]
    Exempt,

    /// Not subject to VAT (nie podlega).
    #[serde(rename = "np")]
    NotApplicable,

    /// Reverse charge (odwrotne obciążenie).
    #[serde(rename = "oo")]
    ReverseCharge,

    /// Other/custom rate.
    #[serde(untagged)]
    Other(u8),
}

impl VatRate {
    /// Get the VAT rate as a decimal multiplier (e.g., 0.23 for 23%).
    pub fn as_decimal(&self) -> Decimal {
        match self {
            VatRate::Standard23 => Decimal::new(23, 2),
            VatRate::Reduced8 => Decimal::new(8, 2),
            VatRate::Reduced5 => Decimal::new(5, 2),
            VatRate::Zero | VatRate::Exempt | VatRate::NotApplicable | VatRate::ReverseCharge => {
                Decimal::ZERO
            }
            VatRate::Other(rate) => Decimal::new(*rate as i64, 2),
        }
    }

    /// Parse VAT rate from a cell value.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let s = s.trim_end_matches('%').trim();

        match s {
            "23" => Some(VatRate::Standard23),
            "8" => Some(VatRate::Reduced8),
            "5" => Some(VatRate::Reduced5),
            "0" => Some(VatRate::Zero),
            "zw" | "zw." | "zwolniony" | "zwolnione" => Some(VatRate::Exempt),
            "np" | "np." | "nie podlega" => Some(VatRate::NotApplicable),
            "oo" | "odwrotne obciążenie" => Some(VatRate::ReverseCharge),
            _ => s.parse::<u8>().ok().filter(|r| *r <= 100).map(VatRate::Other),
        }
    }

    /// Format for display.
    pub fn display(&self) -> String {
        match self {
            VatRate::Standard23 => "23%".to_string(),
            VatRate::Reduced8 => "8%".to_string(),
            VatRate::Reduced5 => "5%".to_string(),
            VatRate::Zero => "0%".to_string(),
            VatRate::Exempt => "zw.".to_string(),
            VatRate::NotApplicable => "np.".to_string(),
            VatRate::ReverseCharge => "oo".to_string(),
            VatRate::Other(rate) => format!("{}%", rate),
        }
    }
}

/// Invoice summary with totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceSummary {
    /// Total net amount (before VAT).
    pub total_net: Decimal,

    /// Total VAT amount.
    pub total_vat: Decimal,

    /// Total gross amount (after VAT).
    pub total_gross: Decimal,

    /// Breakdown of VAT by rate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vat_breakdown: Vec<VatBreakdown>,
}

/// VAT breakdown by rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatBreakdown {
    /// VAT rate.
    pub rate: VatRate,

    /// Net amount at this rate.
    pub net: Decimal,

    /// VAT amount at this rate.
    pub vat: Decimal,

    /// Gross amount at this rate.
    pub gross: Decimal,
}

impl InvoiceSummary {
    /// Summary with `item` added, or `None` if any total overflows.
    fn with_item(&self, item: &LineItem) -> Option<Self> {
        let mut next = self.clone();
        match next.vat_breakdown.iter_mut().find(|b| b.rate == item.vat_rate) {
            Some(entry) => {
                entry.net = entry.net.checked_add(item.total_net)?;
                entry.vat = entry.vat.checked_add(item.vat_amount)?;
                entry.gross = entry.gross.checked_add(item.total_gross)?;
            }
            None => next.vat_breakdown.push(VatBreakdown {
                rate: item.vat_rate,
                net: item.total_net,
                vat: item.vat_amount,
                gross: item.total_gross,
            }),
        }
        next.total_net = next.total_net.checked_add(item.total_net)?;
        next.total_vat = next.total_vat.checked_add(item.vat_amount)?;
        next.total_gross = next.total_gross.checked_add(item.total_gross)?;
        Some(next)
    }
}

/// Provenance of an invoice inside its source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Name of the CSV file the invoice was read from.
    pub file_name: String,

    /// Source line numbers that contributed line items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rows: Vec<u64>,

    /// Non-fatal inconsistencies noticed while assembling the invoice.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Invoice {
    /// Create an invoice with the given number and issue date and no items.
    pub fn new(invoice_number: impl Into<String>, issue_date: NaiveDate) -> Self {
        Self {
            header: InvoiceHeader {
                invoice_number: invoice_number.into(),
                issue_date,
                sale_date: None,
                due_date: None,
                currency: default_currency(),
            },
            issuer: Party::default(),
            receiver: Party::default(),
            line_items: Vec::new(),
            summary: InvoiceSummary::default(),
            source: SourceMetadata::default(),
        }
    }

    /// Append a line item, numbering it and updating the summary.
    ///
    /// Returns `false` and leaves the invoice untouched when a total would
    /// overflow.
    pub fn push_line_item(&mut self, mut item: LineItem) -> bool {
        let Some(summary) = self.summary.with_item(&item) else {
            return false;
        };
        item.ordinal = self.line_items.len() as u32 + 1;
        self.line_items.push(item);
        self.summary = summary;
        true
    }

    /// Recompute summary totals and the per-rate breakdown from line items.
    ///
    /// Returns `false` and keeps the previous summary when a total would
    /// overflow.
    pub fn recalculate_summary(&mut self) -> bool {
        let summary = self
            .line_items
            .iter()
            .try_fold(InvoiceSummary::default(), |summary, item| summary.with_item(item));

        match summary {
            Some(summary) => {
                self.summary = summary;
                true
            }
            None => false,
        }
    }

    /// Validate the invoice data and return any issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.header.invoice_number.is_empty() {
            issues.push("Missing invoice number".to_string());
        }

        if self.issuer.name.is_empty() {
            issues.push("Missing issuer name".to_string());
        }

        if self.issuer.nip.is_none() {
            issues.push("Missing issuer NIP".to_string());
        }

        if self.receiver.name.is_empty() && self.receiver.nip.is_none() {
            issues.push("Missing receiver information".to_string());
        }

        if self.line_items.is_empty() {
            issues.push("No line items".to_string());
        }

        if self.summary.total_gross == Decimal::ZERO {
            issues.push("Total gross is zero".to_string());
        }

        if let Some(due) = self.header.due_date {
            if due < self.header.issue_date {
                issues.push(format!(
                    "Due date ({}) is before issue date ({})",
                    due, self.header.issue_date
                ));
            }
        }

        for item in &self.line_items {
            let Some(expected) = item.total_net.checked_add(item.vat_amount) else {
                issues.push(format!("Line {} net + VAT is out of range", item.ordinal));
                continue;
            };
            let off = expected
                .checked_sub(item.total_gross)
                .is_none_or(|diff| diff.abs() > Decimal::new(1, 2));
            if off {
                issues.push(format!(
                    "Line {} gross ({}) differs from net + VAT ({})",
                    item.ordinal, item.total_gross, expected
                ));
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn item(ordinal: u32, rate: VatRate, net: &str, vat: &str, gross: &str) -> LineItem {
        LineItem {
            ordinal,
            description: format!("item {}", ordinal),
            quantity: Decimal::ONE,
            unit: None,
            unit_price_net: Decimal::from_str(net).unwrap(),
            vat_rate: rate,
            total_net: Decimal::from_str(net).unwrap(),
            vat_amount: Decimal::from_str(vat).unwrap(),
            total_gross: Decimal::from_str(gross).unwrap(),
        }
    }

    #[test]
    fn test_vat_rate_parsing() {
        assert_eq!(VatRate::parse("23%"), Some(VatRate::Standard23));
        assert_eq!(VatRate::parse("23"), Some(VatRate::Standard23));
        assert_eq!(VatRate::parse("8 %"), Some(VatRate::Reduced8));
        assert_eq!(VatRate::parse("zw"), Some(VatRate::Exempt));
        assert_eq!(VatRate::parse("ZW."), Some(VatRate::Exempt));
        assert_eq!(VatRate::parse("np"), Some(VatRate::NotApplicable));
        assert_eq!(VatRate::parse("7"), Some(VatRate::Other(7)));
        assert_eq!(VatRate::parse("150"), None);
        assert_eq!(VatRate::parse("abc"), None);
    }

    #[test]
    fn test_vat_rate_decimal() {
        assert_eq!(VatRate::Standard23.as_decimal(), Decimal::new(23, 2));
        assert_eq!(VatRate::Exempt.as_decimal(), Decimal::ZERO);
    }

    #[test]
    fn test_recalculate_summary_groups_by_rate() {
        let mut invoice = Invoice::new("FV/1/2024", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        invoice.line_items = vec![
            item(1, VatRate::Standard23, "100.00", "23.00", "123.00"),
            item(2, VatRate::Reduced8, "50.00", "4.00", "54.00"),
            item(3, VatRate::Standard23, "10.00", "2.30", "12.30"),
        ];

        invoice.recalculate_summary();

        assert_eq!(invoice.summary.total_net, Decimal::from_str("160.00").unwrap());
        assert_eq!(invoice.summary.total_vat, Decimal::from_str("29.30").unwrap());
        assert_eq!(invoice.summary.total_gross, Decimal::from_str("189.30").unwrap());
        assert_eq!(invoice.summary.vat_breakdown.len(), 2);
        assert_eq!(invoice.summary.vat_breakdown[0].rate, VatRate::Standard23);
        assert_eq!(
            invoice.summary.vat_breakdown[0].gross,
            Decimal::from_str("135.30").unwrap()
        );
    }

    #[test]
    fn test_validate_reports_inconsistent_line() {
        let mut invoice = Invoice::new("FV/2/2024", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        invoice.issuer.name = "ABC Sp. z o.o.".to_string();
        invoice.issuer.nip = Some("5261040828".to_string());
        invoice.receiver.name = "XYZ S.A.".to_string();
        invoice.line_items = vec![item(1, VatRate::Standard23, "100.00", "23.00", "130.00")];
        invoice.recalculate_summary();

        let issues = invoice.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].starts_with("Line 1 gross"));
    }

    #[test]
    fn test_push_line_item_numbers_and_sums() {
        let mut invoice = Invoice::new("FV/3/2024", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert!(invoice.push_line_item(item(0, VatRate::Standard23, "100.00", "23.00", "123.00")));
        assert!(invoice.push_line_item(item(0, VatRate::Reduced5, "20.00", "1.00", "21.00")));

        assert_eq!(invoice.line_items[1].ordinal, 2);
        assert_eq!(invoice.summary.total_gross, Decimal::from_str("144.00").unwrap());
        assert_eq!(invoice.summary.vat_breakdown.len(), 2);
    }

    #[test]
    fn test_push_line_item_rejects_overflowing_totals() {
        let mut invoice = Invoice::new("FV/4/2024", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let max = Decimal::MAX.to_string();
        assert!(invoice.push_line_item(item(0, VatRate::Zero, &max, "0", &max)));
        assert!(!invoice.push_line_item(item(0, VatRate::Zero, "1", "0", "1")));

        assert_eq!(invoice.line_items.len(), 1);
        assert_eq!(invoice.summary.total_net, Decimal::MAX);
        assert!(invoice.recalculate_summary());
    }

    #[test]
    fn test_validate_survives_extreme_amounts() {
        let mut invoice = Invoice::new("FV/5/2024", NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        let max = Decimal::MAX.to_string();
        invoice.line_items = vec![item(1, VatRate::Standard23, &max, &max, &max)];

        let issues = invoice.validate();
        assert!(issues.contains(&"Line 1 net + VAT is out of range".to_string()));
    }
}
