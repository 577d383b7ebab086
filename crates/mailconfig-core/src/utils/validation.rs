/// Input validation utilities
use crate::constants::MAX_EMAIL_ADDRESS_LENGTH;
use crate::error::MailConfigError;
use regex::Regex;

lazy_static::lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$"
    ).unwrap();
}

pub fn validate_email_address(email: &str) -> Result<(), MailConfigError> {
    if email.len() <= MAX_EMAIL_ADDRESS_LENGTH && EMAIL_REGEX.is_match(email) {
        Ok(())
    } else {
        Err(MailConfigError::Validation(format!(
            "Invalid email address: {}",
            email
        )))
    }
}

/// Validates a port entered as text in the admin form
pub fn parse_smtp_port(raw: &str) -> Result<Option<u16>, MailConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<u16>()
        .map(Some)
        .map_err(|_| MailConfigError::Validation(format!("Invalid SMTP port: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email_address("test@example.com").is_ok());
        assert!(validate_email_address("user+tag@example.co.uk").is_ok());
        assert!(validate_email_address("invalid").is_err());
        assert!(validate_email_address("@example.com").is_err());
    }

    #[test]
    fn test_validate_email_length() {
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_ADDRESS_LENGTH));
        assert!(validate_email_address(&long).is_err());
    }

    #[test]
    fn test_parse_smtp_port() {
        assert_eq!(parse_smtp_port("587").unwrap(), Some(587));
        assert_eq!(parse_smtp_port(" 465 ").unwrap(), Some(465));
        assert_eq!(parse_smtp_port("").unwrap(), None);
        assert!(parse_smtp_port("smtp").is_err());
        assert!(parse_smtp_port("70000").is_err());
    }
}
