/// Write path for per-site mail settings
use crate::error::MailConfigError;
use crate::models::{MailConfiguration, SiteMailSettings, TenantId};
use crate::services::resolver::ConfigResolver;
use crate::services::source::SettingsRepository;
use crate::utils::validation::validate_email_address;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Saves settings records and keeps the resolution cache consistent
pub struct MailSettingsService {
    repository: Arc<dyn SettingsRepository>,
    resolver: Arc<ConfigResolver>,
}

impl MailSettingsService {
    pub fn new(repository: Arc<dyn SettingsRepository>, resolver: Arc<ConfigResolver>) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    pub async fn load(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<SiteMailSettings>, MailConfigError> {
        self.repository.load(tenant_id).await
    }

    /// Persists a submitted settings record
    ///
    /// An empty password keeps the stored one. The cache is invalidated
    /// before this returns, so the next resolution sees the new record.
    pub async fn save(
        &self,
        mut submitted: SiteMailSettings,
    ) -> Result<SiteMailSettings, MailConfigError> {
        let tenant_id = submitted.tenant_id;
        let previous = self.repository.load(tenant_id).await?;

        retain_password(&mut submitted.mail, previous.as_ref().map(|p| &p.mail));
        validate_settings(&submitted.mail)?;

        submitted.updated_at = Some(Utc::now());
        self.repository.save(&submitted).await?;

        info!(
            tenant_id = %tenant_id,
            has_custom_dsn = submitted.mail.custom_dsn().is_some(),
            "Saved mail settings"
        );

        self.resolver.on_mail_settings_written(tenant_id).await;

        Ok(submitted)
    }
}

/// Keeps the previous password when the submitted one is empty
pub fn retain_password(submitted: &mut MailConfiguration, previous: Option<&MailConfiguration>) {
    if submitted.smtp_password().is_some() {
        return;
    }
    if let Some(password) = previous.and_then(|p| p.smtp_password()) {
        submitted.smtp_password = Some(password.to_string());
    }
}

/// Rejects a half-filled SMTP form
///
/// Without a custom DSN, setting any of server, user, port or sender address
/// requires all four.
pub fn validate_settings(config: &MailConfiguration) -> Result<(), MailConfigError> {
    if let Some(email) = config.admin_email() {
        validate_email_address(email)?;
    }

    if config.custom_dsn().is_some() {
        return Ok(());
    }

    let fields = [
        ("SMTPServer", config.smtp_server().is_some()),
        ("SMTPUser", config.smtp_user().is_some()),
        ("SMTPPort", config.smtp_port().is_some()),
        ("AdminEmail", config.admin_email().is_some()),
    ];

    if !fields.iter().any(|(_, set)| *set) {
        return Ok(());
    }

    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, set)| !*set)
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(MailConfigError::Validation(format!(
            "When any SMTP setting is set, the following fields must also be filled in: {}",
            missing.join(", ")
        )))
    }
}
