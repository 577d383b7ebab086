/// Sender defaults and the ad-hoc test email
use crate::constants::{TEST_EMAIL_BODY, TEST_EMAIL_SUBJECT_PREFIX};
use crate::error::MailConfigError;
use crate::models::{MailConfiguration, TenantId};
use crate::services::resolver::ConfigResolver;
use crate::services::source::SettingsRepository;
use crate::services::transport::TransportFactory;
use crate::utils::logging::{redact_email, safe_config_context};
use crate::utils::validation::validate_email_address;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MessageBuilder};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of the test email action, shown to the operator as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestSendOutcome {
    Sent { recipient: String },
    Failed { message: String },
}

impl TestSendOutcome {
    fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }

    pub fn message(&self) -> String {
        match self {
            Self::Sent { recipient } => format!("Test email was sent to {}.", recipient),
            Self::Failed { message } => message.clone(),
        }
    }
}

/// Mail-sending helpers built on the effective configuration
pub struct MailService {
    resolver: Arc<ConfigResolver>,
    repository: Arc<dyn SettingsRepository>,
}

impl MailService {
    pub fn new(resolver: Arc<ConfigResolver>, repository: Arc<dyn SettingsRepository>) -> Self {
        Self {
            resolver,
            repository,
        }
    }

    /// Default sender for mail from `tenant_id`
    ///
    /// `None` leaves the caller's own default in place, including when the
    /// configuration cannot be resolved.
    pub async fn default_from(&self, tenant_id: TenantId) -> Option<Mailbox> {
        match self.resolver.get_effective_mail_config(tenant_id).await {
            Ok(config) => sender_mailbox(&config),
            Err(e) => {
                warn!(tenant_id = %tenant_id, error = %e, "No default sender available");
                None
            }
        }
    }

    /// A message builder with the default sender applied when there is one
    pub async fn message_builder(&self, tenant_id: TenantId) -> MessageBuilder {
        let builder = Message::builder();
        match self.default_from(tenant_id).await {
            Some(from) => builder.from(from),
            None => builder,
        }
    }

    /// Sends the test email to the record's `TestEmail` address
    ///
    /// Every failure is reported as a status message rather than an error.
    pub async fn send_test_email(&self, tenant_id: TenantId, site_title: &str) -> TestSendOutcome {
        let settings = match self.repository.load(tenant_id).await {
            Ok(settings) => settings,
            Err(e) => return TestSendOutcome::failed(format!("Failed to load settings: {}", e)),
        };

        let Some(recipient) = settings
            .as_ref()
            .and_then(|s| s.test_email())
            .map(str::to_string)
        else {
            return TestSendOutcome::failed("Please enter a test email address.");
        };

        if validate_email_address(&recipient).is_err() {
            return TestSendOutcome::failed(
                MailConfigError::InvalidRecipient(recipient).to_string(),
            );
        }

        let config = match self.resolver.get_effective_mail_config(tenant_id).await {
            Ok(config) => config,
            Err(e) => return TestSendOutcome::failed(format!("Configuration error: {}", e)),
        };

        let Some(from) = sender_mailbox(&config) else {
            return TestSendOutcome::failed("Error: no sender email address configured.");
        };

        match deliver_test_email(&config, from, &recipient, site_title).await {
            Ok(()) => {
                info!(
                    tenant_id = %tenant_id,
                    recipient = %redact_email(&recipient),
                    "Sent test email"
                );
                TestSendOutcome::Sent { recipient }
            }
            Err(e) => {
                warn!(
                    tenant_id = %tenant_id,
                    error = %e,
                    config = %safe_config_context(&config),
                    "Test email failed"
                );
                TestSendOutcome::failed(format!("Sending failed: {}", e))
            }
        }
    }
}

async fn deliver_test_email(
    config: &MailConfiguration,
    from: Mailbox,
    recipient: &str,
    site_title: &str,
) -> Result<(), MailConfigError> {
    let to: Mailbox = recipient
        .parse()
        .map_err(|_| MailConfigError::InvalidRecipient(recipient.to_string()))?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(format!("{}{}", TEST_EMAIL_SUBJECT_PREFIX, site_title))
        .header(ContentType::TEXT_PLAIN)
        .body(TEST_EMAIL_BODY.to_string())
        .map_err(|e| MailConfigError::Send(format!("Failed to build email: {}", e)))?;

    let transport = TransportFactory::build_transport_descriptor(config)?.into_transport()?;
    transport.send(message).await
}

/// The configured sender, with the display name when one is set
pub fn sender_mailbox(config: &MailConfiguration) -> Option<Mailbox> {
    let email = config.admin_email()?;
    match email.parse() {
        Ok(address) => Some(Mailbox::new(
            config.admin_name().map(str::to_string),
            address,
        )),
        Err(e) => {
            warn!(sender = %redact_email(email), error = %e, "Configured sender is not an address");
            None
        }
    }
}
