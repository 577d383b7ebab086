/// Record sources for mail configuration resolution and the settings store
use crate::constants::ATTR_TENANT_ID;
use crate::error::MailConfigError;
use crate::models::{ConfigCandidate, MailConfiguration, SiteMailSettings, TenantId};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::debug;

/// Reads the record of the site a configuration is resolved for
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TenantRecordSource: Send + Sync {
    async fn tenant_record(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ConfigCandidate>, MailConfigError>;
}

/// Reads the record of the root site
///
/// Only wired in when the host runs multiple sites.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DefaultTenantRecordProvider: Send + Sync {
    async fn default_tenant_record(&self) -> Result<Option<ConfigCandidate>, MailConfigError>;
}

/// Persistence of the per-site settings records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load(&self, tenant_id: TenantId) -> Result<Option<SiteMailSettings>, MailConfigError>;

    async fn save(&self, settings: &SiteMailSettings) -> Result<(), MailConfigError>;
}

/// DynamoDB-backed settings store, one item per site
pub struct DynamoDbSettingsStore {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoDbSettingsStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    pub fn from_env(client: aws_sdk_dynamodb::Client) -> Result<Self, MailConfigError> {
        let table_name = std::env::var("MAIL_SETTINGS_TABLE")
            .map_err(|_| MailConfigError::Config("MAIL_SETTINGS_TABLE not set".to_string()))?;

        Ok(Self::new(client, table_name))
    }
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn put_string(item: &mut HashMap<String, AttributeValue>, name: &str, value: &Option<String>) {
    if let Some(value) = value {
        item.insert(name.to_string(), AttributeValue::S(value.clone()));
    }
}

/// Converts a settings record into a DynamoDB item
pub fn settings_to_item(settings: &SiteMailSettings) -> HashMap<String, AttributeValue> {
    let mail = &settings.mail;
    let mut item = HashMap::new();

    item.insert(
        ATTR_TENANT_ID.to_string(),
        AttributeValue::N(settings.tenant_id.to_string()),
    );
    put_string(&mut item, "SMTPServer", &mail.smtp_server);
    if let Some(port) = mail.smtp_port {
        item.insert("SMTPPort".to_string(), AttributeValue::N(port.to_string()));
    }
    put_string(&mut item, "SMTPUser", &mail.smtp_user);
    put_string(&mut item, "SMTPPassword", &mail.smtp_password);
    put_string(&mut item, "AdminEmail", &mail.admin_email);
    put_string(&mut item, "AdminName", &mail.admin_name);
    put_string(&mut item, "CustomDSN", &mail.custom_dsn);
    put_string(&mut item, "TestEmail", &settings.test_email);
    if let Some(updated_at) = settings.updated_at {
        item.insert(
            "updatedAt".to_string(),
            AttributeValue::S(updated_at.to_rfc3339()),
        );
    }

    item
}

/// Converts a DynamoDB item back into a settings record
pub fn settings_from_item(
    item: &HashMap<String, AttributeValue>,
) -> Result<SiteMailSettings, MailConfigError> {
    let tenant_id = item
        .get(ATTR_TENANT_ID)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse::<u64>().ok())
        .map(TenantId)
        .ok_or_else(|| MailConfigError::Storage("Settings item without tenantId".to_string()))?;

    let smtp_port = item
        .get("SMTPPort")
        .and_then(|v| v.as_n().ok())
        .map(|n| {
            n.parse::<u16>()
                .map_err(|e| MailConfigError::Storage(format!("Invalid SMTPPort '{}': {}", n, e)))
        })
        .transpose()?;

    let updated_at = string_attr(item, "updatedAt")
        .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
        .map(|ts| ts.with_timezone(&Utc));

    Ok(SiteMailSettings {
        tenant_id,
        mail: MailConfiguration {
            smtp_server: string_attr(item, "SMTPServer"),
            smtp_port,
            smtp_user: string_attr(item, "SMTPUser"),
            smtp_password: string_attr(item, "SMTPPassword"),
            admin_email: string_attr(item, "AdminEmail"),
            admin_name: string_attr(item, "AdminName"),
            custom_dsn: string_attr(item, "CustomDSN"),
        },
        test_email: string_attr(item, "TestEmail"),
        updated_at,
    })
}

#[async_trait]
impl SettingsRepository for DynamoDbSettingsStore {
    async fn load(&self, tenant_id: TenantId) -> Result<Option<SiteMailSettings>, MailConfigError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_TENANT_ID, AttributeValue::N(tenant_id.to_string()))
            .send()
            .await
            .map_err(|e| MailConfigError::Storage(format!("DynamoDB get_item failed: {}", e)))?;

        match result.item() {
            Some(item) => {
                debug!(tenant_id = %tenant_id, "Loaded mail settings");
                settings_from_item(item).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn save(&self, settings: &SiteMailSettings) -> Result<(), MailConfigError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(settings_to_item(settings)))
            .send()
            .await
            .map_err(|e| MailConfigError::Storage(format!("DynamoDB put_item failed: {}", e)))?;

        Ok(())
    }
}

#[async_trait]
impl TenantRecordSource for DynamoDbSettingsStore {
    async fn tenant_record(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ConfigCandidate>, MailConfigError> {
        Ok(self.load(tenant_id).await?.map(|s| s.to_candidate()))
    }
}

#[async_trait]
impl DefaultTenantRecordProvider for DynamoDbSettingsStore {
    async fn default_tenant_record(&self) -> Result<Option<ConfigCandidate>, MailConfigError> {
        Ok(self.load(TenantId::DEFAULT).await?.map(|s| s.to_candidate()))
    }
}

/// In-memory settings store for testing and single-process hosts
pub struct InMemorySettingsStore {
    records: tokio::sync::Mutex<HashMap<TenantId, SiteMailSettings>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self {
            records: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Creates a store pre-populated with the given records
    pub fn with_records(records: impl IntoIterator<Item = SiteMailSettings>) -> Self {
        Self {
            records: tokio::sync::Mutex::new(
                records.into_iter().map(|s| (s.tenant_id, s)).collect(),
            ),
        }
    }
}

impl Default for InMemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SettingsRepository for InMemorySettingsStore {
    async fn load(&self, tenant_id: TenantId) -> Result<Option<SiteMailSettings>, MailConfigError> {
        Ok(self.records.lock().await.get(&tenant_id).cloned())
    }

    async fn save(&self, settings: &SiteMailSettings) -> Result<(), MailConfigError> {
        self.records
            .lock()
            .await
            .insert(settings.tenant_id, settings.clone());
        Ok(())
    }
}

#[async_trait]
impl TenantRecordSource for InMemorySettingsStore {
    async fn tenant_record(
        &self,
        tenant_id: TenantId,
    ) -> Result<Option<ConfigCandidate>, MailConfigError> {
        Ok(self.load(tenant_id).await?.map(|s| s.to_candidate()))
    }
}

#[async_trait]
impl DefaultTenantRecordProvider for InMemorySettingsStore {
    async fn default_tenant_record(&self) -> Result<Option<ConfigCandidate>, MailConfigError> {
        Ok(self.load(TenantId::DEFAULT).await?.map(|s| s.to_candidate()))
    }
}
