/// Mail configuration models
use crate::constants::{
    ENV_ADMIN_EMAIL, ENV_ADMIN_NAME, ENV_CUSTOM_DSN, ENV_SMTP_PASSWORD, ENV_SMTP_PORT,
    ENV_SMTP_SERVER, ENV_SMTP_USER,
};
use crate::error::MailConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a site/subsite. `0` is the root site.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub u64);

impl TenantId {
    pub const DEFAULT: TenantId = TenantId(0);

    pub fn is_default(&self) -> bool {
        *self == Self::DEFAULT
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TenantId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Returns the value unless it is absent or the empty string
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Outbound mail configuration, either resolved or as stored for one scope
///
/// Empty strings and port `0` count as "not set" everywhere.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailConfiguration {
    #[serde(rename = "SMTPServer", default)]
    pub smtp_server: Option<String>,
    #[serde(rename = "SMTPPort", default)]
    pub smtp_port: Option<u16>,
    #[serde(rename = "SMTPUser", default)]
    pub smtp_user: Option<String>,
    #[serde(rename = "SMTPPassword", default)]
    pub smtp_password: Option<String>,
    #[serde(rename = "AdminEmail", default)]
    pub admin_email: Option<String>,
    #[serde(rename = "AdminName", default)]
    pub admin_name: Option<String>,
    /// Overrides every SMTP field when set
    #[serde(rename = "CustomDSN", default)]
    pub custom_dsn: Option<String>,
}

impl MailConfiguration {
    pub fn smtp_server(&self) -> Option<&str> {
        non_empty(&self.smtp_server)
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.smtp_port.filter(|port| *port != 0)
    }

    pub fn smtp_user(&self) -> Option<&str> {
        non_empty(&self.smtp_user)
    }

    pub fn smtp_password(&self) -> Option<&str> {
        non_empty(&self.smtp_password)
    }

    pub fn admin_email(&self) -> Option<&str> {
        non_empty(&self.admin_email)
    }

    pub fn admin_name(&self) -> Option<&str> {
        non_empty(&self.admin_name)
    }

    pub fn custom_dsn(&self) -> Option<&str> {
        non_empty(&self.custom_dsn)
    }

    /// True when any field that describes the transport itself is set
    ///
    /// The sender address is deliberately not part of this check: a
    /// configuration that only names a sender is still "unconfigured".
    pub fn has_any_transport_field(&self) -> bool {
        self.smtp_server().is_some()
            || self.smtp_user().is_some()
            || self.smtp_password().is_some()
            || self.smtp_port().is_some()
    }

    /// True when no field at all is set
    pub fn is_empty(&self) -> bool {
        !self.has_any_transport_field()
            && self.admin_email().is_none()
            && self.admin_name().is_none()
            && self.custom_dsn().is_none()
    }

    /// Copy safe to hand out to API clients: the password is masked
    pub fn redacted(&self) -> Self {
        Self {
            smtp_password: self.smtp_password().map(|_| "***".to_string()),
            ..self.clone()
        }
    }
}

impl fmt::Debug for MailConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailConfiguration")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password().map(|_| "***"))
            .field("admin_email", &self.admin_email)
            .field("admin_name", &self.admin_name)
            .field("custom_dsn", &self.custom_dsn.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Where a candidate configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind", content = "tenantId")]
pub enum ConfigScope {
    /// The record of the requested site
    Tenant(TenantId),
    /// The record of the root site
    Global,
    /// Process-wide static defaults
    StaticFallback,
}

impl fmt::Display for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tenant(id) => write!(f, "tenant:{}", id),
            Self::Global => write!(f, "global"),
            Self::StaticFallback => write!(f, "static"),
        }
    }
}

/// A scoped configuration offered to the resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCandidate {
    pub scope: ConfigScope,
    pub settings: MailConfiguration,
}

impl ConfigCandidate {
    pub fn new(scope: ConfigScope, settings: MailConfiguration) -> Self {
        Self { scope, settings }
    }
}

/// Static process-wide mail defaults, read once at startup
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StaticMailConfig {
    #[serde(default)]
    pub smtp_server: Option<String>,
    #[serde(default)]
    pub smtp_port: Option<u16>,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_name: Option<String>,
    /// Standalone DSN used when the assembled configuration is incomplete
    #[serde(default)]
    pub custom_dsn: Option<String>,
}

impl StaticMailConfig {
    /// Loads the static defaults from `MAIL_*` environment variables
    ///
    /// Every variable is optional; an unparsable port is an error.
    pub fn from_env() -> Result<Self, MailConfigError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        let smtp_port = var(ENV_SMTP_PORT)
            .map(|raw| {
                raw.trim().parse::<u16>().map_err(|e| {
                    MailConfigError::Config(format!("Invalid {}: {}", ENV_SMTP_PORT, e))
                })
            })
            .transpose()?;

        let config = Self {
            smtp_server: var(ENV_SMTP_SERVER),
            smtp_port,
            smtp_user: var(ENV_SMTP_USER),
            smtp_password: var(ENV_SMTP_PASSWORD),
            admin_email: var(ENV_ADMIN_EMAIL),
            admin_name: var(ENV_ADMIN_NAME),
            custom_dsn: var(ENV_CUSTOM_DSN),
        };

        tracing::info!(
            has_smtp_server = config.smtp_server.is_some(),
            has_custom_dsn = config.custom_dsn.is_some(),
            "Loaded static mail configuration"
        );

        Ok(config)
    }

    /// The static defaults as a configuration, without the standalone DSN
    pub fn fallback_fields(&self) -> MailConfiguration {
        MailConfiguration {
            smtp_server: self.smtp_server.clone(),
            smtp_port: self.smtp_port,
            smtp_user: self.smtp_user.clone(),
            smtp_password: self.smtp_password.clone(),
            admin_email: self.admin_email.clone(),
            admin_name: self.admin_name.clone(),
            custom_dsn: None,
        }
    }

    pub fn custom_dsn(&self) -> Option<&str> {
        non_empty(&self.custom_dsn)
    }
}

impl fmt::Debug for StaticMailConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticMailConfig")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_password", &self.smtp_password.as_ref().map(|_| "***"))
            .field("admin_email", &self.admin_email)
            .field("admin_name", &self.admin_name)
            .field("custom_dsn", &self.custom_dsn.as_ref().map(|_| "***"))
            .finish()
    }
}
