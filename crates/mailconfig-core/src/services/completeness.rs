/// Completeness checks for candidate mail configurations
use crate::models::MailConfiguration;

/// How usable a candidate configuration is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completeness {
    /// A DSN is set, or every SMTP field plus the sender address is set
    Complete,
    /// A record exists but cannot describe a transport on its own
    Incomplete,
    /// There is no record for this scope
    Absent,
}

impl Completeness {
    pub fn of(candidate: Option<&MailConfiguration>) -> Self {
        match candidate {
            None => Self::Absent,
            Some(config) if config.custom_dsn().is_some() => Self::Complete,
            Some(config)
                if config.smtp_server().is_some()
                    && config.smtp_user().is_some()
                    && config.smtp_password().is_some()
                    && config.smtp_port().is_some()
                    && config.admin_email().is_some() =>
            {
                Self::Complete
            }
            Some(_) => Self::Incomplete,
        }
    }

    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

/// True when the candidate can be used as-is
pub fn is_complete(candidate: Option<&MailConfiguration>) -> bool {
    Completeness::of(candidate).is_complete()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_smtp() -> MailConfiguration {
        MailConfiguration {
            smtp_server: Some("smtp.example.com".to_string()),
            smtp_port: Some(587),
            smtp_user: Some("mailer".to_string()),
            smtp_password: Some("secret".to_string()),
            admin_email: Some("admin@example.com".to_string()),
            admin_name: None,
            custom_dsn: None,
        }
    }

    #[test]
    fn test_absent_is_not_complete() {
        assert_eq!(Completeness::of(None), Completeness::Absent);
        assert!(!is_complete(None));
    }

    #[test]
    fn test_dsn_alone_is_complete() {
        let config = MailConfiguration {
            custom_dsn: Some("smtp://relay:25".to_string()),
            ..Default::default()
        };
        assert!(is_complete(Some(&config)));
    }

    #[test]
    fn test_full_smtp_is_complete_without_name() {
        assert!(is_complete(Some(&full_smtp())));
    }

    #[test]
    fn test_each_required_field_is_needed() {
        let strip: [fn(&mut MailConfiguration); 5] = [
            |c| c.smtp_server = None,
            |c| c.smtp_port = Some(0),
            |c| c.smtp_user = Some(String::new()),
            |c| c.smtp_password = None,
            |c| c.admin_email = None,
        ];

        for strip_field in strip {
            let mut config = full_smtp();
            strip_field(&mut config);
            assert_eq!(
                Completeness::of(Some(&config)),
                Completeness::Incomplete,
                "{:?}",
                config
            );
        }
    }

    #[test]
    fn test_empty_dsn_does_not_count() {
        let config = MailConfiguration {
            custom_dsn: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(Completeness::of(Some(&config)), Completeness::Incomplete);
    }
}
