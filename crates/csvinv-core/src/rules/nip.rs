//! NIP (Polish Tax Identification Number) normalization and validation.

use super::patterns::NIP_CELL;

/// Normalize a NIP cell to its 10 digits, or `None` if it is not shaped
/// like a NIP.
pub fn normalize_nip(cell: &str) -> Option<String> {
    let caps = NIP_CELL.captures(cell.trim())?;
    Some(format!("{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[4]))
}

/// Validate a Polish NIP using the checksum algorithm.
///
/// NIP format: 10 digits where the last digit is a checksum.
/// Weights: 6, 5, 7, 2, 3, 4, 5, 6, 7
pub fn validate_nip(nip: &str) -> bool {
    let digits: Vec<u32> = nip
        .chars()
        .filter_map(|c| c.to_digit(10))
        .collect();

    if digits.len() != 10 {
        return false;
    }

    let weights = [6, 5, 7, 2, 3, 4, 5, 6, 7];
    let sum: u32 = digits
        .iter()
        .take(9)
        .zip(weights.iter())
        .map(|(d, w)| d * w)
        .sum();

    let checksum = sum % 11;

    // A checksum of 10 is never issued
    if checksum == 10 {
        return false;
    }

    checksum == digits[9]
}

/// Format NIP with dashes (XXX-XXX-XX-XX).
pub fn format_nip(nip: &str) -> String {
    let digits: String = nip.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() != 10 {
        return nip.to_string();
    }

    format!(
        "{}-{}-{}-{}",
        &digits[0..3],
        &digits[3..6],
        &digits[6..8],
        &digits[8..10]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_nip_valid() {
        assert!(validate_nip("5261040828"));
        assert!(validate_nip("123-456-32-18"));
        assert!(validate_nip("123 456 32 18"));
    }

    #[test]
    fn test_validate_nip_invalid() {
        assert!(!validate_nip("1234567890")); // Invalid checksum
        assert!(!validate_nip("123456789")); // Too short
        assert!(!validate_nip("12345678901")); // Too long
    }

    #[test]
    fn test_normalize_nip() {
        assert_eq!(normalize_nip("526-104-08-28"), Some("5261040828".to_string()));
        assert_eq!(normalize_nip(" PL 5261040828 "), Some("5261040828".to_string()));
        assert_eq!(normalize_nip("52610408"), None);
    }

    #[test]
    fn test_format_nip() {
        assert_eq!(format_nip("5261040828"), "526-104-08-28");
        assert_eq!(format_nip("526-104-08-28"), "526-104-08-28");
    }
}
