//! Single-row parsing: one CSV record becomes one invoice line.

use chrono::NaiveDate;
use csv::StringRecord;
use rust_decimal::{Decimal, RoundingStrategy};

use super::columns::{Column, ColumnMap};
use crate::error::RowError;
use crate::models::invoice::{LineItem, Party, VatRate};
use crate::rules::{normalize_nip, parse_date, parse_polish_amount, validate_nip};

/// Header fields and the line item carried by one row.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// Source line number.
    pub line: u64,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub sale_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub currency: String,
    pub issuer: Party,
    pub receiver: Party,
    /// Line item; `ordinal` is assigned when the row joins an invoice.
    pub item: LineItem,
}

/// Parses records against a resolved column layout.
pub struct RowParser<'a> {
    columns: &'a ColumnMap,
    validate_nip: bool,
    default_currency: &'a str,
}

impl<'a> RowParser<'a> {
    pub fn new(columns: &'a ColumnMap, validate_nip: bool, default_currency: &'a str) -> Self {
        Self {
            columns,
            validate_nip,
            default_currency,
        }
    }

    /// Parse one record. `line` is used for error reporting only.
    pub fn parse(&self, record: &StringRecord, line: u64) -> Result<ParsedRow, RowError> {
        let invoice_number = self.required(record, Column::InvoiceNumber, line)?.to_string();
        let issue_date = self.date(record, Column::IssueDate, line)?
            .ok_or_else(|| missing(Column::IssueDate, line))?;
        let sale_date = self.date(record, Column::SaleDate, line)?;
        let due_date = self.date(record, Column::DueDate, line)?;

        let issuer = Party {
            name: self.required(record, Column::IssuerName, line)?.to_string(),
            nip: self.nip(record, Column::IssuerNip, line)?,
        };
        let receiver = Party {
            name: self.get(record, Column::ReceiverName).unwrap_or_default().to_string(),
            nip: self.nip(record, Column::ReceiverNip, line)?,
        };

        let currency = self
            .get(record, Column::Currency)
            .map(str::to_uppercase)
            .unwrap_or_else(|| self.default_currency.to_string());

        let item = self.line_item(record, line)?;

        Ok(ParsedRow {
            line,
            invoice_number,
            issue_date,
            sale_date,
            due_date,
            currency,
            issuer,
            receiver,
            item,
        })
    }

    fn line_item(&self, record: &StringRecord, line: u64) -> Result<LineItem, RowError> {
        let description = self.required(record, Column::Description, line)?.to_string();
        let quantity = self.amount(record, Column::Quantity, line)?.unwrap_or(Decimal::ONE);
        let unit_price = self.amount(record, Column::UnitPriceNet, line)?;
        let given_net = self.amount(record, Column::TotalNet, line)?;
        let given_vat = self.amount(record, Column::TotalVat, line)?;
        let given_gross = self.amount(record, Column::TotalGross, line)?;

        let total_net = match (given_net, unit_price) {
            (Some(net), _) => net,
            (None, Some(price)) => quantity
                .checked_mul(price)
                .map(round_money)
                .ok_or_else(|| out_of_range(Column::TotalNet, line))?,
            (None, None) => {
                return Err(RowError::new(
                    line,
                    "needs either unit_price_net or total_net",
                ));
            }
        };

        let unit_price_net = match unit_price {
            Some(price) => price,
            None if !quantity.is_zero() => total_net
                .checked_div(quantity)
                .map(round_money)
                .ok_or_else(|| out_of_range(Column::UnitPriceNet, line))?,
            None => Decimal::ZERO,
        };

        let vat_rate = match self.get(record, Column::VatRate) {
            Some(cell) => VatRate::parse(cell).ok_or_else(|| {
                RowError::new(line, format!("invalid VAT rate '{}'", cell))
            })?,
            None => infer_vat_rate(total_net, given_vat)
                .ok_or_else(|| missing(Column::VatRate, line))?,
        };

        let vat_amount = match given_vat {
            Some(vat) => vat,
            None => total_net
                .checked_mul(vat_rate.as_decimal())
                .map(round_money)
                .ok_or_else(|| out_of_range(Column::TotalVat, line))?,
        };
        let total_gross = match given_gross {
            Some(gross) => gross,
            None => total_net
                .checked_add(vat_amount)
                .ok_or_else(|| out_of_range(Column::TotalGross, line))?,
        };

        Ok(LineItem {
            ordinal: 0,
            description,
            quantity,
            unit: self.get(record, Column::Unit).map(str::to_string),
            unit_price_net,
            vat_rate,
            total_net,
            vat_amount,
            total_gross,
        })
    }

    fn get<'r>(&self, record: &'r StringRecord, column: Column) -> Option<&'r str> {
        self.columns.get(record, column)
    }

    fn required<'r>(
        &self,
        record: &'r StringRecord,
        column: Column,
        line: u64,
    ) -> Result<&'r str, RowError> {
        self.get(record, column).ok_or_else(|| missing(column, line))
    }

    fn date(
        &self,
        record: &StringRecord,
        column: Column,
        line: u64,
    ) -> Result<Option<NaiveDate>, RowError> {
        match self.get(record, column) {
            Some(cell) => parse_date(cell).map(Some).ok_or_else(|| {
                RowError::new(line, format!("invalid date '{}' in {}", cell, column.name()))
            }),
            None => Ok(None),
        }
    }

    fn amount(
        &self,
        record: &StringRecord,
        column: Column,
        line: u64,
    ) -> Result<Option<Decimal>, RowError> {
        match self.get(record, column) {
            Some(cell) => parse_polish_amount(cell).map(Some).ok_or_else(|| {
                RowError::new(line, format!("invalid amount '{}' in {}", cell, column.name()))
            }),
            None => Ok(None),
        }
    }

    fn nip(
        &self,
        record: &StringRecord,
        column: Column,
        line: u64,
    ) -> Result<Option<String>, RowError> {
        let Some(cell) = self.get(record, column) else {
            return Ok(None);
        };

        let nip = normalize_nip(cell).ok_or_else(|| {
            RowError::new(line, format!("malformed NIP '{}' in {}", cell, column.name()))
        })?;

        if self.validate_nip && !validate_nip(&nip) {
            return Err(RowError::new(
                line,
                format!("NIP checksum failed for '{}' in {}", cell, column.name()),
            ));
        }

        Ok(Some(nip))
    }
}

/// Commercial rounding to grosze: half away from zero.
fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn missing(column: Column, line: u64) -> RowError {
    RowError::new(line, format!("missing {}", column.name()))
}

fn out_of_range(column: Column, line: u64) -> RowError {
    RowError::new(line, format!("amount out of range in {}", column.name()))
}

/// Recover a standard rate from net and VAT amounts.
fn infer_vat_rate(net: Decimal, vat: Option<Decimal>) -> Option<VatRate> {
    let vat = vat?;
    if net.is_zero() {
        return None;
    }

    let percent = vat.checked_div(net)?.checked_mul(Decimal::ONE_HUNDRED)?.round();
    [
        VatRate::Standard23,
        VatRate::Reduced8,
        VatRate::Reduced5,
        VatRate::Zero,
    ]
    .into_iter()
    .find(|rate| rate.as_decimal() * Decimal::ONE_HUNDRED == percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn headers() -> ColumnMap {
        ColumnMap::from_headers(&StringRecord::from(vec![
            "invoice_number",
            "issue_date",
            "issuer_name",
            "issuer_nip",
            "description",
            "quantity",
            "unit_price_net",
            "vat_rate",
            "total_net",
            "total_vat",
            "total_gross",
        ]))
        .unwrap()
    }

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_derives_missing_totals() {
        let columns = headers();
        let parser = RowParser::new(&columns, true, "PLN");

        let row = parser
            .parse(
                &record(&["FV/1", "15.01.2024", "ABC", "526-104-08-28", "Widget", "3", "10,50", "23%", "", "", ""]),
                2,
            )
            .unwrap();

        assert_eq!(row.issuer.nip.as_deref(), Some("5261040828"));
        assert_eq!(row.currency, "PLN");
        assert_eq!(row.item.total_net, dec("31.50"));
        assert_eq!(row.item.vat_amount, dec("7.25"));
        assert_eq!(row.item.total_gross, dec("38.75"));
    }

    #[test]
    fn test_given_totals_win() {
        let columns = headers();
        let parser = RowParser::new(&columns, true, "PLN");

        let row = parser
            .parse(
                &record(&["FV/1", "2024-01-15", "ABC", "", "Service", "", "", "8", "100,00", "8,00", "108,00"]),
                3,
            )
            .unwrap();

        assert_eq!(row.item.quantity, Decimal::ONE);
        assert_eq!(row.item.unit_price_net, dec("100.00"));
        assert_eq!(row.item.vat_rate, VatRate::Reduced8);
        assert_eq!(row.item.total_gross, dec("108.00"));
    }

    #[test]
    fn test_infers_vat_rate_from_amounts() {
        let columns = headers();
        let parser = RowParser::new(&columns, true, "PLN");

        let row = parser
            .parse(
                &record(&["FV/1", "2024-01-15", "ABC", "", "Service", "", "", "", "200,00", "46,00", ""]),
                4,
            )
            .unwrap();

        assert_eq!(row.item.vat_rate, VatRate::Standard23);
        assert_eq!(row.item.total_gross, dec("246.00"));
    }

    #[test]
    fn test_row_errors() {
        let columns = headers();
        let parser = RowParser::new(&columns, true, "PLN");

        let err = parser
            .parse(&record(&["FV/1", "2024-13-45", "ABC", "", "X", "", "1", "23", "", "", ""]), 5)
            .unwrap_err();
        assert_eq!(err.to_string(), "row 5: invalid date '2024-13-45' in issue_date");

        let err = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "1234567890", "X", "", "1", "23", "", "", ""]), 6)
            .unwrap_err();
        assert_eq!(err.row, 6);
        assert!(err.reason.starts_with("NIP checksum failed"));

        let err = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "", "X", "", "", "23", "", "", ""]), 7)
            .unwrap_err();
        assert_eq!(err.reason, "needs either unit_price_net or total_net");

        let err = parser
            .parse(&record(&["", "2024-01-15", "ABC", "", "X", "", "1", "23", "", "", ""]), 8)
            .unwrap_err();
        assert_eq!(err.reason, "missing invoice_number");
    }

    #[test]
    fn test_nip_validation_can_be_disabled() {
        let columns = headers();
        let parser = RowParser::new(&columns, false, "EUR");

        let row = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "1234567890", "X", "", "1", "23", "", "", ""]), 2)
            .unwrap();

        assert_eq!(row.issuer.nip.as_deref(), Some("1234567890"));
        assert_eq!(row.currency, "EUR");
    }

    #[test]
    fn test_overflowing_amounts_become_row_errors() {
        let columns = headers();
        let parser = RowParser::new(&columns, true, "PLN");
        let huge = "100000000000000000000";

        let err = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "", "X", huge, huge, "23", "", "", ""]), 9)
            .unwrap_err();
        assert_eq!(err.to_string(), "row 9: amount out of range in total_net");

        let max = Decimal::MAX.to_string();
        let err = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "", "X", "", "", "23", &max, &max, ""]), 10)
            .unwrap_err();
        assert_eq!(err.reason, "amount out of range in total_gross");

        let err = parser
            .parse(&record(&["FV/1", "2024-01-15", "ABC", "", "X", "0.0000001", "", "23", &max, "", ""]), 11)
            .unwrap_err();
        assert_eq!(err.reason, "amount out of range in unit_price_net");
    }

    #[test]
    fn test_vat_rate_inference_tolerates_extreme_ratio() {
        assert_eq!(infer_vat_rate(dec("0.0000001"), Some(Decimal::MAX)), None);
    }
}
