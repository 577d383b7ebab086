/// Logging utilities for PII redaction and secure logging
///
/// Mail settings carry credentials and operator addresses. These helpers
/// keep both out of the logs while leaving enough to debug with.
use crate::models::MailConfiguration;
use regex::Regex;
use std::sync::LazyLock;

// Email redaction regex
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b").unwrap());

/// Redacts email addresses from text, preserving domain for debugging
///
/// # Examples
/// ```
/// use mailconfig_core::utils::logging::redact_email;
///
/// assert_eq!(redact_email("user@example.com"), "***@example.com");
/// assert_eq!(redact_email("Contact: test@acme.com for help"), "Contact: ***@acme.com for help");
/// ```
pub fn redact_email(text: &str) -> String {
    EMAIL_PATTERN
        .replace_all(text, |caps: &regex::Captures| {
            let email = &caps[0];
            if let Some(at_pos) = email.find('@') {
                format!("***{}", &email[at_pos..])
            } else {
                "***@***".to_string()
            }
        })
        .to_string()
}

/// Creates safe log context for a mail configuration
///
/// Reports which fields are set, never their values, except for the server
/// host and the sender's domain.
pub fn safe_config_context(config: &MailConfiguration) -> serde_json::Value {
    serde_json::json!({
        "smtp_server": config.smtp_server(),
        "smtp_port": config.smtp_port(),
        "has_user": config.smtp_user().is_some(),
        "has_password": config.smtp_password().is_some(),
        "sender_domain": config.admin_email().map(extract_domain),
        "has_custom_dsn": config.custom_dsn().is_some(),
    })
}

/// Extracts domain from email address for safe logging
fn extract_domain(email: &str) -> String {
    email.split('@').nth(1).unwrap_or("unknown").to_string()
}
