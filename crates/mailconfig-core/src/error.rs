/// Error types for the mail configuration system
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailConfigError {
    /// Some SMTP fields are set but the configuration cannot be completed
    #[error("SMTP configuration is incomplete: {0}")]
    IncompleteConfiguration(String),

    #[error("Cache backend error: {0}")]
    Cache(String),

    #[error("Transport configuration error: {0}")]
    TransportConfiguration(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Send error: {0}")]
    Send(String),
}

impl MailConfigError {
    /// Determines if an error is retriable
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::Storage(_) => true,
            Self::Cache(_) => true,
            Self::Send(_) => true, // SMTP servers throttle and drop connections
            Self::IncompleteConfiguration(_) => false,
            Self::TransportConfiguration(_) => false,
            Self::InvalidRecipient(_) => false,
            Self::Validation(_) => false,
            Self::Config(_) => false,
        }
    }
}

// Implement conversions for common error types
impl From<serde_json::Error> for MailConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

impl From<std::env::VarError> for MailConfigError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retriable_errors() {
        assert!(MailConfigError::Storage("test".to_string()).is_retriable());
        assert!(MailConfigError::Cache("test".to_string()).is_retriable());
        assert!(!MailConfigError::Validation("test".to_string()).is_retriable());
        assert!(!MailConfigError::IncompleteConfiguration("test".to_string()).is_retriable());
    }

    #[test]
    fn test_error_display() {
        let err = MailConfigError::IncompleteConfiguration("missing AdminEmail".to_string());
        assert_eq!(
            err.to_string(),
            "SMTP configuration is incomplete: missing AdminEmail"
        );
    }

    #[test]
    fn test_serde_error_is_cache_error() {
        let err: MailConfigError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, MailConfigError::Cache(_)));
    }
}
