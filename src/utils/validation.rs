use crate::utils::error::{FieldError, Result, SubmitError};
use email_address::EmailAddress;
use url::Url;

/// Startup-time validation hook for configuration types.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(SubmitError::config(format!(
            "{field_name}: URL cannot be empty"
        )));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(SubmitError::config(format!(
                "{field_name}: unsupported URL scheme: {scheme}"
            ))),
        },
        Err(e) => Err(SubmitError::config(format!(
            "{field_name}: invalid URL format: {e}"
        ))),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SubmitError::config(format!(
            "{field_name}: value cannot be empty or whitespace-only"
        )));
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(SubmitError::config(format!(
            "{field_name}: value must be at least {min_value}"
        )));
    }
    Ok(())
}

// -- per-field submission checks ---------------------------------------------
//
// Lengths are counted in Unicode scalar values, not bytes, so multi-byte
// names are not penalized.

pub fn check_char_range(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> std::result::Result<(), FieldError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(FieldError::new(
            field,
            format!("must be between {min} and {max} characters"),
        ));
    }
    Ok(())
}

pub fn check_max_chars(field: &str, value: &str, max: usize) -> std::result::Result<(), FieldError> {
    if value.chars().count() > max {
        return Err(FieldError::new(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

pub fn check_email(field: &str, value: &str) -> std::result::Result<(), FieldError> {
    if EmailAddress::parse_with_options(value, Default::default()).is_err() {
        return Err(FieldError::new(field, "must be a valid email address"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("hcaptcha.endpoint", "https://api.hcaptcha.com/siteverify").is_ok());
        assert!(validate_url("hcaptcha.endpoint", "http://localhost:8080").is_ok());
        assert!(validate_url("hcaptcha.endpoint", "").is_err());
        assert!(validate_url("hcaptcha.endpoint", "not-a-url").is_err());
        assert!(validate_url("hcaptcha.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("contact_email", "me@example.com").is_ok());
        assert!(validate_non_empty_string("contact_email", "   ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("rate_limit.max_requests", 5, 1).is_ok());
        assert!(validate_positive_number("rate_limit.max_requests", 0, 1).is_err());
    }

    #[test]
    fn test_check_char_range() {
        assert!(check_char_range("name", "Jo", 2, 50).is_ok());
        assert!(check_char_range("name", "J", 2, 50).is_err());
        assert!(check_char_range("name", &"x".repeat(51), 2, 50).is_err());
        // multi-byte characters count once each
        assert!(check_char_range("name", "Ære", 2, 3).is_ok());
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("email", "jo@x.com").is_ok());
        assert!(check_email("email", "not-an-email").is_err());
        assert!(check_email("email", "").is_err());
    }
}
