/// Transport descriptors built from resolved mail configurations
use crate::constants::{NULL_TRANSPORT_DSN, SMTP_PORT, SMTP_SCHEME, SMTPS_PORT, SMTPS_SCHEME};
use crate::error::MailConfigError;
use crate::models::MailConfiguration;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::transport::stub::AsyncStubTransport;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::fmt;
use tracing::{debug, info};

/// Connection string for the mail transport
#[derive(Clone, PartialEq, Eq)]
pub enum TransportDescriptor {
    /// An operator-supplied DSN, passed through verbatim
    Custom(String),
    /// A DSN synthesized from the discrete SMTP fields
    Smtp(String),
    /// Discards every message
    Null,
}

impl TransportDescriptor {
    pub fn dsn(&self) -> &str {
        match self {
            Self::Custom(dsn) | Self::Smtp(dsn) => dsn,
            Self::Null => NULL_TRANSPORT_DSN,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Custom(_) => "custom",
            Self::Smtp(_) => "smtp",
            Self::Null => "null",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The DSN with its password masked, for logs and API responses
    pub fn redacted_dsn(&self) -> String {
        match url::Url::parse(self.dsn()) {
            Ok(mut parsed) if parsed.password().is_some() => {
                if parsed.set_password(Some("***")).is_err() {
                    return "***".to_string();
                }
                parsed.to_string()
            }
            Ok(parsed) => parsed.to_string(),
            Err(_) => "***".to_string(),
        }
    }

    /// Builds a live `lettre` transport for this descriptor
    ///
    /// `smtp` and `smtps` DSNs map onto lettre's SMTP transport, `null`
    /// onto a stub that accepts and drops messages.
    pub fn into_transport(self) -> Result<MailTransport, MailConfigError> {
        let scheme = self
            .dsn()
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .ok_or_else(|| {
                MailConfigError::TransportConfiguration("DSN has no scheme".to_string())
            })?;

        match scheme.as_str() {
            "null" => Ok(MailTransport::Null(AsyncStubTransport::new_ok())),
            SMTP_SCHEME | SMTPS_SCHEME => {
                let endpoint = SmtpEndpoint::parse(self.dsn()).map_err(|e| {
                    MailConfigError::TransportConfiguration(format!(
                        "Invalid SMTP DSN {}: {}",
                        self.redacted_dsn(),
                        e
                    ))
                })?;
                Ok(MailTransport::Smtp(endpoint.build()?))
            }
            other => Err(MailConfigError::TransportConfiguration(format!(
                "Unsupported transport scheme: {}",
                other
            ))),
        }
    }
}

/// How an SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSecurity {
    /// TLS from the first byte
    Implicit,
    /// STARTTLS whenever the server offers it, before any credentials are sent
    Opportunistic,
}

/// Connection parameters of an `smtp` or `smtps` DSN
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpEndpoint {
    pub host: String,
    pub port: u16,
    pub security: SmtpSecurity,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl SmtpEndpoint {
    /// Parses the DSN; port 465 or the `smtps` scheme mean implicit TLS
    pub fn parse(dsn: &str) -> Result<Self, String> {
        let url = url::Url::parse(dsn).map_err(|e| e.to_string())?;
        let host = url
            .host_str()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| "missing host".to_string())?
            .to_string();

        let implicit = url.scheme().eq_ignore_ascii_case(SMTPS_SCHEME)
            || url.port() == Some(SMTPS_PORT);
        let port = url.port().unwrap_or(if implicit { SMTPS_PORT } else { SMTP_PORT });
        let security = if implicit {
            SmtpSecurity::Implicit
        } else {
            SmtpSecurity::Opportunistic
        };

        let username = Some(decode_credential(url.username())?).filter(|user| !user.is_empty());
        let password = url.password().map(decode_credential).transpose()?;

        Ok(Self {
            host,
            port,
            security,
            username,
            password,
        })
    }

    fn build(self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailConfigError> {
        let parameters = TlsParameters::builder(self.host.clone())
            .build()
            .map_err(|e| {
                MailConfigError::TransportConfiguration(format!(
                    "TLS setup failed for {}: {}",
                    self.host, e
                ))
            })?;
        let tls = match self.security {
            SmtpSecurity::Implicit => Tls::Wrapper(parameters),
            SmtpSecurity::Opportunistic => Tls::Opportunistic(parameters),
        };

        debug!(
            host = %self.host,
            port = self.port,
            security = ?self.security,
            authenticated = self.username.is_some(),
            "Building SMTP transport"
        );

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.host)
            .port(self.port)
            .tls(tls);
        if let Some(username) = self.username {
            let password = self.password.unwrap_or_default();
            builder = builder.credentials(Credentials::new(username, password));
        }

        Ok(builder.build())
    }
}

impl fmt::Debug for SmtpEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpEndpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

impl fmt::Debug for TransportDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransportDescriptor::{}({})", self.kind(), self.redacted_dsn())
    }
}

/// A ready-to-use mail transport
pub enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    Null(AsyncStubTransport),
}

impl MailTransport {
    pub async fn send(&self, message: Message) -> Result<(), MailConfigError> {
        match self {
            Self::Smtp(transport) => {
                let response = transport
                    .send(message)
                    .await
                    .map_err(|e| MailConfigError::Send(e.to_string()))?;
                debug!(code = %response.code(), "SMTP server accepted message");
                Ok(())
            }
            Self::Null(transport) => {
                transport
                    .send(message)
                    .await
                    .map_err(|e| MailConfigError::Send(e.to_string()))?;
                info!("Message discarded by null transport");
                Ok(())
            }
        }
    }
}

/// Turns resolved configurations into transport descriptors
pub struct TransportFactory;

impl TransportFactory {
    /// Picks the custom DSN, a synthesized SMTP DSN, or the null transport
    ///
    /// Fails only for a custom DSN that cannot be a connection string; input
    /// coming from the resolver never does.
    pub fn build_transport_descriptor(
        config: &MailConfiguration,
    ) -> Result<TransportDescriptor, MailConfigError> {
        if let Some(dsn) = config.custom_dsn() {
            if dsn.trim().is_empty() || !dsn.contains("://") {
                return Err(MailConfigError::TransportConfiguration(
                    "Custom DSN must have the form scheme://...".to_string(),
                ));
            }
            return Ok(TransportDescriptor::Custom(dsn.to_string()));
        }

        match (
            config.smtp_server(),
            config.smtp_user(),
            config.smtp_password(),
            config.smtp_port(),
        ) {
            (Some(server), Some(user), Some(password), Some(port)) => {
                Ok(TransportDescriptor::Smtp(format!(
                    "{}://{}:{}@{}:{}",
                    SMTP_SCHEME,
                    encode_credential(user),
                    encode_credential(password),
                    server,
                    port
                )))
            }
            _ => Ok(TransportDescriptor::Null),
        }
    }
}

/// Percent-encodes a DSN credential; spaces become `%20`
fn encode_credential(value: &str) -> String {
    // byte_serialize escapes a literal '+' as %2B, so any '+' left is a space
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn decode_credential(value: &str) -> Result<String, String> {
    percent_encoding::percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| "credentials are not valid UTF-8".to_string())
}
