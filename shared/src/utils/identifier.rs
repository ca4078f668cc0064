//! Login identifier utilities
//!
//! Serena accounts log in with a mobile number. Numbers arrive either in
//! the local `09xxxxxxxx` form or in E.164; both are accepted and used
//! verbatim as cache-key identifiers after normalization.

use once_cell::sync::Lazy;
use regex::Regex;

// Local mobile number: leading 0 followed by a 9-digit subscriber number
static LOCAL_MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^0[35789]\d{8}$").unwrap());

// International phone number (E.164 format)
static INTERNATIONAL_PHONE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap());

/// Strip common formatting characters from an identifier
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Check whether an identifier is a valid login phone number
pub fn is_valid_identifier(identifier: &str) -> bool {
    let normalized = normalize_identifier(identifier);
    LOCAL_MOBILE_REGEX.is_match(&normalized) || INTERNATIONAL_PHONE_REGEX.is_match(&normalized)
}

/// Mask an identifier for log output (e.g. `090****567`)
pub fn mask_identifier(identifier: &str) -> String {
    let normalized = normalize_identifier(identifier);
    if normalized.len() >= 7 {
        format!(
            "{}****{}",
            &normalized[0..3],
            &normalized[normalized.len() - 3..]
        )
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identifier() {
        assert_eq!(normalize_identifier("090-123-4567"), "0901234567");
        assert_eq!(normalize_identifier("+84 90 123 4567"), "+84901234567");
        assert_eq!(normalize_identifier("(090) 1234 567"), "0901234567");
    }

    #[test]
    fn test_is_valid_identifier() {
        assert!(is_valid_identifier("0901234567"));
        assert!(is_valid_identifier("0351234567"));
        assert!(is_valid_identifier("+84901234567"));
        assert!(!is_valid_identifier("0101234567")); // invalid prefix
        assert!(!is_valid_identifier("090123456")); // too short
        assert!(!is_valid_identifier("09012345678")); // too long
        assert!(!is_valid_identifier("not-a-phone"));
    }

    #[test]
    fn test_mask_identifier() {
        assert_eq!(mask_identifier("0901234567"), "090****567");
        assert_eq!(mask_identifier("12345"), "****");
    }
}
