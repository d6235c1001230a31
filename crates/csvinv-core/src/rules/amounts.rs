//! Amount parsing for Polish-formatted numbers.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_CELL;

/// Parse a Polish-formatted amount (e.g., "1 234,56", "1234.56", "-5,00 zł").
pub fn parse_polish_amount(s: &str) -> Option<Decimal> {
    let s = s.trim();
    if !AMOUNT_CELL.is_match(s) {
        return None;
    }

    let negative = s.starts_with('-');

    // Drop spaces, non-breaking spaces and any currency suffix
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    // Replace comma with period for decimal
    let normalized = if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned.replace(',', ".")
    } else if cleaned.contains(',') && cleaned.contains('.') {
        // Whichever separator comes last is the decimal one
        let comma_pos = cleaned.rfind(',');
        let dot_pos = cleaned.rfind('.');
        match (comma_pos, dot_pos) {
            (Some(c), Some(d)) if c > d => cleaned.replace('.', "").replace(',', "."),
            (Some(_), Some(_)) => cleaned.replace(',', ""),
            _ => cleaned,
        }
    } else {
        cleaned
    };

    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

/// Format amount in Polish style (1 234,56).
pub fn format_polish_amount(amount: Decimal) -> String {
    let s = format!("{:.2}", amount.abs());
    let Some((integer_part, decimal_part)) = s.split_once('.') else {
        return s;
    };

    // Add thousand separators
    let chars: Vec<char> = integer_part.chars().collect();
    let mut formatted = String::new();
    if amount.is_sign_negative() && !amount.is_zero() {
        formatted.push('-');
    }

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            formatted.push(' ');
        }
        formatted.push(*c);
    }

    format!("{},{}", formatted, decimal_part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_polish_amount() {
        assert_eq!(
            parse_polish_amount("1 234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_polish_amount("1234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_polish_amount("1234.56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
        assert_eq!(
            parse_polish_amount("12 345 678,90 zł"),
            Some(Decimal::from_str("12345678.90").unwrap())
        );
        assert_eq!(
            parse_polish_amount("1.234,56"),
            Some(Decimal::from_str("1234.56").unwrap())
        );
    }

    #[test]
    fn test_parse_negative_amount() {
        assert_eq!(
            parse_polish_amount("-50,00"),
            Some(Decimal::from_str("-50.00").unwrap())
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_polish_amount("abc"), None);
        assert_eq!(parse_polish_amount(""), None);
        assert_eq!(parse_polish_amount("12abc"), None);
    }

    #[test]
    fn test_format_polish_amount() {
        let amount = Decimal::from_str("1234.56").unwrap();
        assert_eq!(format_polish_amount(amount), "1 234,56");

        let amount = Decimal::from_str("12345678.90").unwrap();
        assert_eq!(format_polish_amount(amount), "12 345 678,90");

        let amount = Decimal::from_str("-1500").unwrap();
        assert_eq!(format_polish_amount(amount), "-1 500,00");
    }
}
