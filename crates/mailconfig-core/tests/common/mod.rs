//! Common test utilities and helpers for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use mailconfig_core::error::MailConfigError;
use mailconfig_core::models::{ConfigCandidate, ConfigScope, MailConfiguration, TenantId};
use mailconfig_core::services::{DefaultTenantRecordProvider, TenantRecordSource};

mockall::mock! {
    pub TenantSource {}

    #[async_trait]
    impl TenantRecordSource for TenantSource {
        async fn tenant_record(
            &self,
            tenant_id: TenantId,
        ) -> Result<Option<ConfigCandidate>, MailConfigError>;
    }
}

mockall::mock! {
    pub DefaultSource {}

    #[async_trait]
    impl DefaultTenantRecordProvider for DefaultSource {
        async fn default_tenant_record(&self) -> Result<Option<ConfigCandidate>, MailConfigError>;
    }
}

/// A complete SMTP configuration for `server`
pub fn smtp_config(server: &str) -> MailConfiguration {
    MailConfiguration {
        smtp_server: Some(server.to_string()),
        smtp_port: Some(587),
        smtp_user: Some(format!("mailer@{}", server)),
        smtp_password: Some("secret".to_string()),
        admin_email: Some(format!("admin@{}", server)),
        admin_name: Some("Site Admin".to_string()),
        custom_dsn: None,
    }
}

pub fn tenant_candidate(id: u64, settings: MailConfiguration) -> ConfigCandidate {
    ConfigCandidate::new(ConfigScope::Tenant(TenantId(id)), settings)
}

pub fn global_candidate(settings: MailConfiguration) -> ConfigCandidate {
    ConfigCandidate::new(ConfigScope::Global, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smtp_config_is_complete() {
        assert!(mailconfig_core::services::is_complete(Some(&smtp_config(
            "example.com"
        ))));
    }
}
