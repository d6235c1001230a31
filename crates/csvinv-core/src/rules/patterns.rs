//! Regex patterns for whole-cell field matching.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// DD.MM.YYYY, DD/MM/YYYY or DD-MM-YYYY (two-digit years allowed).
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})$"
    ).unwrap();

    /// YYYY-MM-DD, YYYY.MM.DD or YYYY/MM/DD.
    pub static ref DATE_YMD: Regex = Regex::new(
        r"^(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})$"
    ).unwrap();

    /// Optional "PL" prefix, then 10 digits with optional dashes or spaces.
    pub static ref NIP_CELL: Regex = Regex::new(
        r"^(?i:PL)?\s*(\d{3})[\s\-]?(\d{3})[\s\-]?(\d{2})[\s\-]?(\d{2})$"
    ).unwrap();

    /// Signed amount with optional thousand separators and currency suffix.
    pub static ref AMOUNT_CELL: Regex = Regex::new(
        r"^-?[\d\s\u{00a0}.,]+(?:\s*(?i:zł|zl|pln|eur|usd))?$"
    ).unwrap();
}
