/// Per-site mail settings endpoints
use axum::{
    Json,
    extract::{Path, State},
};
use mailconfig_core::models::{MailConfiguration, SiteMailSettings};
use mailconfig_core::utils::validation::parse_smtp_port;
use mailconfig_core::{MailConfigError, TenantId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::{context::ApiContext, error::ApiError};

/// Port as typed into the form: a number or a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PortInput {
    Number(u16),
    Text(String),
}

impl PortInput {
    fn parse(&self) -> Result<Option<u16>, MailConfigError> {
        match self {
            PortInput::Number(0) => Ok(None),
            PortInput::Number(port) => Ok(Some(*port)),
            PortInput::Text(raw) => parse_smtp_port(raw),
        }
    }
}

/// Body of a settings save; fields use the stored record's names
#[derive(Debug, Default, Deserialize)]
pub struct MailSettingsRequest {
    #[serde(rename = "SMTPServer", default)]
    pub smtp_server: Option<String>,
    #[serde(rename = "SMTPPort", default)]
    pub smtp_port: Option<PortInput>,
    #[serde(rename = "SMTPUser", default)]
    pub smtp_user: Option<String>,
    /// Empty or absent keeps the stored password
    #[serde(rename = "SMTPPassword", default)]
    pub smtp_password: Option<String>,
    #[serde(rename = "AdminEmail", default)]
    pub admin_email: Option<String>,
    #[serde(rename = "AdminName", default)]
    pub admin_name: Option<String>,
    #[serde(rename = "CustomDSN", default)]
    pub custom_dsn: Option<String>,
    #[serde(rename = "TestEmail", default)]
    pub test_email: Option<String>,
}

impl MailSettingsRequest {
    pub fn into_settings(self, tenant_id: TenantId) -> Result<SiteMailSettings, MailConfigError> {
        let smtp_port = match &self.smtp_port {
            Some(port) => port.parse()?,
            None => None,
        };

        let mail = MailConfiguration {
            smtp_server: trimmed(self.smtp_server),
            smtp_port,
            smtp_user: trimmed(self.smtp_user),
            smtp_password: self.smtp_password,
            admin_email: trimmed(self.admin_email),
            admin_name: trimmed(self.admin_name),
            custom_dsn: trimmed(self.custom_dsn),
        };

        Ok(SiteMailSettings {
            test_email: trimmed(self.test_email),
            ..SiteMailSettings::new(tenant_id, mail)
        })
    }
}

// Passwords are kept verbatim; leading spaces may be part of one
fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Settings as returned to the admin: no password, only whether one is stored
#[derive(Debug, Serialize)]
pub struct MailSettingsResponse {
    #[serde(flatten)]
    pub settings: SiteMailSettings,
    #[serde(rename = "hasPassword")]
    pub has_password: bool,
}

impl From<SiteMailSettings> for MailSettingsResponse {
    fn from(settings: SiteMailSettings) -> Self {
        Self {
            has_password: settings.mail.smtp_password().is_some(),
            settings: settings.redacted(),
        }
    }
}

/// Stored settings for one site
pub async fn get_settings(
    State(ctx): State<Arc<ApiContext>>,
    Path(tenant_id): Path<u64>,
) -> Result<Json<MailSettingsResponse>, ApiError> {
    let tenant_id = ctx.site(tenant_id)?;

    let settings = ctx
        .settings
        .load(tenant_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No mail settings for site {}", tenant_id)))?;

    Ok(Json(settings.into()))
}

/// Saves one site's settings and invalidates the resolution cache
pub async fn put_settings(
    State(ctx): State<Arc<ApiContext>>,
    Path(tenant_id): Path<u64>,
    Json(req): Json<MailSettingsRequest>,
) -> Result<Json<MailSettingsResponse>, ApiError> {
    let tenant_id = ctx.site(tenant_id)?;
    info!(tenant_id = %tenant_id, "Saving mail settings");

    let submitted = req.into_settings(tenant_id)?;
    let saved = ctx.settings.save(submitted).await?;

    Ok(Json(saved.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_accepts_number_or_text() {
        let req: MailSettingsRequest =
            serde_json::from_value(serde_json::json!({ "SMTPPort": 587 })).unwrap();
        let settings = req.into_settings(TenantId(1)).unwrap();
        assert_eq!(settings.mail.smtp_port, Some(587));

        let req: MailSettingsRequest =
            serde_json::from_value(serde_json::json!({ "SMTPPort": " 465 " })).unwrap();
        let settings = req.into_settings(TenantId(1)).unwrap();
        assert_eq!(settings.mail.smtp_port, Some(465));

        let req: MailSettingsRequest =
            serde_json::from_value(serde_json::json!({ "SMTPPort": "" })).unwrap();
        let settings = req.into_settings(TenantId(1)).unwrap();
        assert_eq!(settings.mail.smtp_port, None);
    }

    #[test]
    fn test_bad_port_is_validation_error() {
        let req: MailSettingsRequest =
            serde_json::from_value(serde_json::json!({ "SMTPPort": "smtp" })).unwrap();
        assert!(matches!(
            req.into_settings(TenantId(1)),
            Err(MailConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_response_hides_password() {
        let response = MailSettingsResponse::from(SiteMailSettings::new(
            TenantId(2),
            MailConfiguration {
                smtp_password: Some("secret".to_string()),
                ..Default::default()
            },
        ));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["hasPassword"], true);
        assert_eq!(json["SMTPPassword"], serde_json::Value::Null);
        assert_eq!(json["tenantId"], 2);
    }

    #[test]
    fn test_blank_fields_become_unset() {
        let req: MailSettingsRequest = serde_json::from_value(serde_json::json!({
            "SMTPServer": "  smtp.example.com ",
            "SMTPUser": "   ",
            "SMTPPassword": " secret",
            "TestEmail": "ops@example.com"
        }))
        .unwrap();

        let settings = req.into_settings(TenantId(2)).unwrap();
        assert_eq!(settings.tenant_id, TenantId(2));
        assert_eq!(settings.mail.smtp_server.as_deref(), Some("smtp.example.com"));
        assert_eq!(settings.mail.smtp_user, None);
        assert_eq!(settings.mail.smtp_password.as_deref(), Some(" secret"));
        assert_eq!(settings.test_email(), Some("ops@example.com"));
    }
}
