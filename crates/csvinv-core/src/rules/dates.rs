//! Date parsing for CSV cells.

use chrono::NaiveDate;

use super::patterns::{DATE_DMY, DATE_YMD};

/// Parse a date cell in ISO (`2024-01-15`) or Polish (`15.01.2024`) order.
pub fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();

    if let Some(caps) = DATE_YMD.captures(cell) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DMY.captures(cell) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if year < 100 {
        // Two-digit year: 00-50 is 2000s, 51-99 is 1900s
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}
