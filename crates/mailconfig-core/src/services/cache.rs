/// Cache of resolved mail configurations
///
/// The cache is an optimization only. [`ConfigCache`] turns every backend
/// failure into a miss or a no-op so that resolution never depends on it.
use crate::constants::{
    ATTR_CACHE_KEY, ATTR_CONFIG, ATTR_TTL, CACHE_KEY_PREFIX, CONFIG_CACHE_TTL_SECONDS,
};
use crate::error::MailConfigError;
use crate::models::{MailConfiguration, TenantId};
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Key of one cached configuration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_tenant(tenant_id: TenantId) -> Self {
        Self(format!("{}{}", CACHE_KEY_PREFIX, tenant_id))
    }

    /// The fixed key used when the host has no notion of sites
    pub fn single_site() -> Self {
        Self(CACHE_KEY_PREFIX.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw storage behind [`ConfigCache`]
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// Returns the stored value unless it is missing or expired
    async fn get(&self, key: &str) -> Result<Option<MailConfiguration>, MailConfigError>;

    async fn set(
        &self,
        key: &str,
        value: &MailConfiguration,
        ttl: Duration,
    ) -> Result<(), MailConfigError>;

    async fn delete(&self, key: &str) -> Result<(), MailConfigError>;

    async fn clear(&self) -> Result<(), MailConfigError>;
}

/// Outcome of a cache read
#[derive(Debug)]
pub enum CacheLookup {
    Hit(MailConfiguration),
    Miss,
    /// The backend failed; callers treat this exactly like a miss
    Unavailable(MailConfigError),
}

/// Which entries a write to one site's settings clears
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidationScope {
    /// Clear every site's entry
    #[default]
    AllTenants,
    /// Clear only the written site's entry
    ///
    /// Writes to the root site still clear everything, since other sites
    /// may have resolved through its record.
    Tenant,
}

impl FromStr for InvalidationScope {
    type Err = MailConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "" => Ok(Self::AllTenants),
            "tenant" => Ok(Self::Tenant),
            other => Err(MailConfigError::Config(format!(
                "Unknown cache invalidation scope: {}",
                other
            ))),
        }
    }
}

/// Best-effort cache of resolved configurations with a fixed 24h TTL
#[derive(Clone)]
pub struct ConfigCache {
    backend: Arc<dyn CacheBackend>,
}

impl ConfigCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryCacheBackend::new()))
    }

    pub fn ttl() -> Duration {
        Duration::from_secs(CONFIG_CACHE_TTL_SECONDS)
    }

    pub async fn get(&self, key: &CacheKey) -> CacheLookup {
        match self.backend.get(key.as_str()).await {
            Ok(Some(config)) => {
                debug!(cache_key = %key, "Mail config cache hit");
                CacheLookup::Hit(config)
            }
            Ok(None) => {
                debug!(cache_key = %key, "Mail config cache miss");
                CacheLookup::Miss
            }
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Mail config cache unavailable");
                CacheLookup::Unavailable(e)
            }
        }
    }

    /// Stores a snapshot; returns whether the backend accepted it
    pub async fn set(&self, key: &CacheKey, value: &MailConfiguration) -> bool {
        match self.backend.set(key.as_str(), value, Self::ttl()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Failed to store mail config in cache");
                false
            }
        }
    }

    pub async fn invalidate(&self, key: &CacheKey) -> bool {
        match self.backend.delete(key.as_str()).await {
            Ok(()) => {
                info!(cache_key = %key, "Invalidated mail config cache entry");
                true
            }
            Err(e) => {
                warn!(cache_key = %key, error = %e, "Failed to invalidate mail config cache entry");
                false
            }
        }
    }

    pub async fn invalidate_all(&self) -> bool {
        match self.backend.clear().await {
            Ok(()) => {
                info!("Cleared mail config cache");
                true
            }
            Err(e) => {
                warn!(error = %e, "Failed to clear mail config cache");
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: MailConfiguration,
    expires_at: DateTime<Utc>,
}

/// Process-local cache backend; expired entries are dropped on read
pub struct InMemoryCacheBackend {
    entries: tokio::sync::Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self {
            entries: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

impl Default for InMemoryCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<MailConfiguration>, MailConfigError> {
        let mut entries = self.entries.lock().await;
        let now = Utc::now();

        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: &MailConfiguration,
        ttl: Duration,
    ) -> Result<(), MailConfigError> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| MailConfigError::Cache(format!("Invalid TTL: {}", e)))?;

        self.entries.lock().await.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                expires_at: Utc::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MailConfigError> {
        self.entries.lock().await.remove(key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), MailConfigError> {
        self.entries.lock().await.clear();
        Ok(())
    }
}

/// DynamoDB-backed cache shared by every instance of the host
///
/// Items carry a `ttl` attribute for DynamoDB's own expiry; since that
/// deletion is lazy, reads check the timestamp as well.
pub struct DynamoDbCacheBackend {
    client: aws_sdk_dynamodb::Client,
    table_name: String,
}

impl DynamoDbCacheBackend {
    pub fn new(client: aws_sdk_dynamodb::Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn all_keys(&self) -> Result<Vec<String>, MailConfigError> {
        let mut keys = Vec::new();
        let mut start_key = None;

        loop {
            let page = self
                .client
                .scan()
                .table_name(&self.table_name)
                .projection_expression("#k")
                .expression_attribute_names("#k", ATTR_CACHE_KEY)
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| MailConfigError::Cache(format!("DynamoDB scan failed: {}", e)))?;

            keys.extend(
                page.items()
                    .iter()
                    .filter_map(|item| item.get(ATTR_CACHE_KEY))
                    .filter_map(|v| v.as_s().ok())
                    .cloned(),
            );

            match page.last_evaluated_key() {
                Some(last) => start_key = Some(last.clone()),
                None => break,
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl CacheBackend for DynamoDbCacheBackend {
    async fn get(&self, key: &str) -> Result<Option<MailConfiguration>, MailConfigError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ATTR_CACHE_KEY, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| MailConfigError::Cache(format!("DynamoDB get_item failed: {}", e)))?;

        let Some(item) = result.item() else {
            return Ok(None);
        };

        let expires_at = item
            .get(ATTR_TTL)
            .and_then(|v| v.as_n().ok())
            .and_then(|n| n.parse::<i64>().ok())
            .unwrap_or(0);
        if expires_at <= Utc::now().timestamp() {
            return Ok(None);
        }

        let raw = item
            .get(ATTR_CONFIG)
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| MailConfigError::Cache(format!("Cache item {} has no config", key)))?;

        Ok(Some(serde_json::from_str(raw)?))
    }

    async fn set(
        &self,
        key: &str,
        value: &MailConfiguration,
        ttl: Duration,
    ) -> Result<(), MailConfigError> {
        let expiration = Utc::now().timestamp() + ttl.as_secs() as i64;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .item(ATTR_CACHE_KEY, AttributeValue::S(key.to_string()))
            .item(ATTR_CONFIG, AttributeValue::S(serde_json::to_string(value)?))
            .item(ATTR_TTL, AttributeValue::N(expiration.to_string()))
            .send()
            .await
            .map_err(|e| MailConfigError::Cache(format!("DynamoDB put_item failed: {}", e)))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), MailConfigError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key(ATTR_CACHE_KEY, AttributeValue::S(key.to_string()))
            .send()
            .await
            .map_err(|e| MailConfigError::Cache(format!("DynamoDB delete_item failed: {}", e)))?;

        Ok(())
    }

    async fn clear(&self) -> Result<(), MailConfigError> {
        let keys = self.all_keys().await?;
        let count = keys.len();

        for key in keys {
            self.delete(&key).await?;
        }

        debug!(deleted = count, "Cleared DynamoDB mail config cache");
        Ok(())
    }
}
