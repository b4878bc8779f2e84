//! Boundary input validation.
//!
//! Request schemas use `Option` fields so a missing key and a blank value
//! fail the same way; handlers pull each field through [`required_field`]
//! before any domain logic runs. Email addresses additionally pass a
//! format and length check. Everything downstream uses bound query
//! parameters, so no content-based sanitization happens here.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

const MIN_EMAIL_LENGTH: usize = 5;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();
}

/// Rejects missing and all-whitespace values with the given message.
///
/// The value is returned exactly as sent; normalization (trimming, case)
/// is the model's job, and passwords must never be altered here.
pub fn required_field(value: Option<&str>, message: &str) -> Result<String, AppError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value.to_string()),
        _ => Err(AppError::BadRequest(message.to_string())),
    }
}

/// Validates an email address and returns it trimmed.
pub fn validate_email(email: &str) -> Result<String, AppError> {
    let trimmed = email.trim();

    if trimmed.len() < MIN_EMAIL_LENGTH
        || trimmed.len() > MAX_EMAIL_LENGTH
        || !EMAIL_REGEX.is_match(trimmed)
    {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_field_present() {
        let value = required_field(Some("chai"), "All fields are required");
        assert_eq!("chai", value.unwrap());
    }

    #[test]
    fn test_required_field_preserves_whitespace() {
        let value = required_field(Some("  spaced  "), "All fields are required");
        assert_eq!("  spaced  ", value.unwrap());
    }

    #[test]
    fn test_required_field_missing_and_blank() {
        for value in [None, Some(""), Some("   "), Some("\t\n")] {
            let result = required_field(value, "All fields are required");
            assert!(result.is_err(), "Should reject {:?}", value);
        }
    }

    #[test]
    fn test_valid_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("test.email@domain.co.uk").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_email_trimming() {
        assert_eq!("user@example.com", validate_email(" user@example.com ").unwrap());
    }

    #[test]
    fn test_invalid_email_format() {
        for email in ["invalid", "user@", "@example.com", "user@@example.com"] {
            assert!(validate_email(email).is_err(), "Should reject {}", email);
        }
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(validate_email(&too_long).is_err());
        assert!(validate_email("a@b").is_err());
    }
}
