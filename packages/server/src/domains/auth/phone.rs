//! Phone number validation and canonicalization.
//!
//! The canonical +country-code form is the key for both the OTP store
//! and the identity directory, so every inbound phone passes through
//! here before anything else looks at it.

use crate::common::AuthError;

/// Canonicalize a loosely formatted phone number.
///
/// Ten-digit numbers are assumed to be Indian mobiles and get the +91
/// prefix; numbers that already carry a country code keep it. Input that
/// does not look like a phone number at all is rejected.
pub fn canonicalize_phone(raw: &str) -> Result<String, AuthError> {
    let trimmed = raw.trim();
    if !looks_like_phone(trimmed) {
        return Err(AuthError::Validation(
            "Valid phone number is required".to_string(),
        ));
    }

    let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() == 10 {
        Ok(format!("+91{digits}"))
    } else if digits.len() == 12 && digits.starts_with("91") {
        Ok(format!("+{digits}"))
    } else {
        // Already carries a country code, or the format is unclear;
        // pass it through unchanged.
        Ok(trimmed.to_string())
    }
}

/// Optional leading '+', 10 to 15 digits, no leading zero.
fn looks_like_phone(s: &str) -> bool {
    let rest = s.strip_prefix('+').unwrap_or(s);
    (10..=15).contains(&rest.len())
        && rest.chars().all(|c| c.is_ascii_digit())
        && !rest.starts_with('0')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_digit_number_gets_indian_country_code() {
        assert_eq!(canonicalize_phone("9999999999").unwrap(), "+919999999999");
    }

    #[test]
    fn twelve_digit_number_with_prefix_gets_plus() {
        assert_eq!(
            canonicalize_phone("919999999999").unwrap(),
            "+919999999999"
        );
    }

    #[test]
    fn canonical_input_is_unchanged() {
        assert_eq!(
            canonicalize_phone("+919999999999").unwrap(),
            "+919999999999"
        );
        assert_eq!(canonicalize_phone("+12025550123").unwrap(), "+12025550123");
    }

    #[test]
    fn unclear_format_passes_through_unchanged() {
        // 11 digits, no prefix: no country code is guessed.
        assert_eq!(canonicalize_phone("12025550123").unwrap(), "12025550123");
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(canonicalize_phone("not-a-phone").is_err());
        assert!(canonicalize_phone("12345").is_err());
        assert!(canonicalize_phone("0123456789").is_err());
        assert!(canonicalize_phone("").is_err());
    }
}
