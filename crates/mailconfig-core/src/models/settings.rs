/// Persisted per-site mail settings
use crate::models::config::{ConfigCandidate, ConfigScope, MailConfiguration, TenantId, non_empty};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The mail settings record of one site, as edited in the admin
///
/// The password is stored in cleartext.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteMailSettings {
    #[serde(rename = "tenantId")]
    pub tenant_id: TenantId,
    #[serde(flatten)]
    pub mail: MailConfiguration,
    /// Recipient of the ad-hoc test email; never used for resolution
    #[serde(rename = "TestEmail", default)]
    pub test_email: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SiteMailSettings {
    pub fn new(tenant_id: TenantId, mail: MailConfiguration) -> Self {
        Self {
            tenant_id,
            mail,
            test_email: None,
            updated_at: None,
        }
    }

    pub fn test_email(&self) -> Option<&str> {
        non_empty(&self.test_email)
    }

    /// This record as a resolution candidate
    ///
    /// The root site's record is offered as the global scope.
    pub fn to_candidate(&self) -> ConfigCandidate {
        let scope = if self.tenant_id.is_default() {
            ConfigScope::Global
        } else {
            ConfigScope::Tenant(self.tenant_id)
        };
        ConfigCandidate::new(scope, self.mail.clone())
    }

    /// Copy safe to hand out to API clients: the password is left out
    ///
    /// Saving the copy back unchanged keeps the stored password.
    pub fn redacted(&self) -> Self {
        Self {
            mail: MailConfiguration {
                smtp_password: None,
                ..self.mail.clone()
            },
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_json_is_flat() {
        let json = r#"{
            "tenantId": 3,
            "SMTPServer": "smtp.example.com",
            "SMTPPort": 587,
            "SMTPUser": "mailer",
            "SMTPPassword": "",
            "AdminEmail": "admin@example.com",
            "TestEmail": "ops@example.com"
        }"#;

        let settings: SiteMailSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.tenant_id, TenantId(3));
        assert_eq!(settings.mail.smtp_port(), Some(587));
        assert_eq!(settings.mail.smtp_password(), None);
        assert_eq!(settings.test_email(), Some("ops@example.com"));
        assert_eq!(settings.updated_at, None);
    }

    #[test]
    fn test_redacted_drops_password() {
        let settings = SiteMailSettings::new(
            TenantId(2),
            MailConfiguration {
                smtp_user: Some("mailer".to_string()),
                smtp_password: Some("secret".to_string()),
                ..Default::default()
            },
        );

        let redacted = settings.redacted();
        assert_eq!(redacted.mail.smtp_password, None);
        assert_eq!(redacted.mail.smtp_user.as_deref(), Some("mailer"));
        assert!(!serde_json::to_string(&redacted).unwrap().contains("secret"));
    }

    #[test]
    fn test_candidate_scope() {
        let root = SiteMailSettings::new(TenantId::DEFAULT, MailConfiguration::default());
        assert_eq!(root.to_candidate().scope, ConfigScope::Global);

        let sub = SiteMailSettings::new(TenantId(9), MailConfiguration::default());
        assert_eq!(sub.to_candidate().scope, ConfigScope::Tenant(TenantId(9)));
    }
}
