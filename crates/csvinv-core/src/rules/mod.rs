//! Cell-level parsers for Polish invoice fields.

pub mod amounts;
pub mod dates;
pub mod nip;
pub mod patterns;

pub use amounts::{format_polish_amount, parse_polish_amount};
pub use dates::parse_date;
pub use nip::{format_nip, normalize_nip, validate_nip};
