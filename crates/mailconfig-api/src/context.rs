/// API Context - shared state for all API handlers
use crate::auth::JwtValidator;
use anyhow::{Context, anyhow};
use crate::error::ApiError;
use mailconfig_core::models::{StaticMailConfig, TenantId};
use mailconfig_core::services::cache::DynamoDbCacheBackend;
use mailconfig_core::services::source::DynamoDbSettingsStore;
use mailconfig_core::services::{
    ConfigCache, ConfigResolver, DefaultTenantRecordProvider, InvalidationScope, MailService,
    MailSettingsService, SettingsRepository, TenantRecordSource,
};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_SITE_TITLE: &str = "Site";

/// Deployment choices that shape the services
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    pub static_config: StaticMailConfig,
    pub multi_tenancy: bool,
    pub invalidation: InvalidationScope,
    /// Expected JWT issuer; empty disables the issuer check
    pub jwt_issuer: String,
    /// Used in the test email subject
    pub site_title: String,
}

/// API Context contains shared resources for API handlers
#[derive(Clone)]
pub struct ApiContext {
    /// Settings store, also checked by the health endpoint
    pub settings_store: Arc<dyn SettingsRepository>,

    pub resolver: Arc<ConfigResolver>,

    pub settings: Arc<MailSettingsService>,

    pub mail: Arc<MailService>,

    /// JWT validator
    pub jwt_validator: Arc<JwtValidator>,

    /// Expected JWT issuer (from environment)
    pub jwt_issuer: String,

    pub site_title: String,
}

impl ApiContext {
    /// Create a new API context from the environment
    pub async fn new() -> anyhow::Result<Arc<Self>> {
        let aws_config = aws_config::load_from_env().await;
        let dynamodb_client = aws_sdk_dynamodb::Client::new(&aws_config);

        let store = Arc::new(DynamoDbSettingsStore::from_env(dynamodb_client.clone())?);

        let choice = cache_choice(
            std::env::var("MAIL_CACHE_TABLE").ok().as_deref(),
            parse_flag(
                "MAIL_CACHE_IN_MEMORY",
                std::env::var("MAIL_CACHE_IN_MEMORY").ok().as_deref(),
            )?,
        )?;
        let cache = match choice {
            CacheChoice::DynamoDb(table) => {
                info!(table = %table, "Using DynamoDB configuration cache");
                ConfigCache::new(Arc::new(DynamoDbCacheBackend::new(dynamodb_client, table)))
            }
            CacheChoice::InMemory => {
                warn!("Using in-memory configuration cache; not shared across instances");
                ConfigCache::in_memory()
            }
        };

        let jwks_json =
            std::env::var("JWKS_JSON").context("JWKS_JSON environment variable not set")?;
        let jwt_validator = Arc::new(JwtValidator::new(&jwks_json).map_err(|e| anyhow!(e))?);

        let options = ContextOptions {
            static_config: StaticMailConfig::from_env()?,
            multi_tenancy: parse_flag(
                "MULTI_TENANCY",
                std::env::var("MULTI_TENANCY").ok().as_deref(),
            )?,
            invalidation: std::env::var("CACHE_INVALIDATION")
                .unwrap_or_default()
                .parse()?,
            jwt_issuer: std::env::var("JWT_ISSUER")
                .context("JWT_ISSUER environment variable not set")?,
            site_title: std::env::var("SITE_TITLE")
                .unwrap_or_else(|_| DEFAULT_SITE_TITLE.to_string()),
        };

        Ok(Self::assemble(store, cache, jwt_validator, options))
    }

    /// Wires the services around one settings store
    pub fn assemble<S>(
        store: Arc<S>,
        cache: ConfigCache,
        jwt_validator: Arc<JwtValidator>,
        options: ContextOptions,
    ) -> Arc<Self>
    where
        S: SettingsRepository + TenantRecordSource + DefaultTenantRecordProvider + 'static,
    {
        let mut resolver = ConfigResolver::new(store.clone(), options.static_config, cache)
            .with_invalidation(options.invalidation);
        if options.multi_tenancy {
            resolver = resolver.with_tenancy(store.clone());
        }
        let resolver = Arc::new(resolver);

        info!(
            multi_tenancy = options.multi_tenancy,
            invalidation = ?options.invalidation,
            "Mail configuration services ready"
        );

        Arc::new(Self {
            settings_store: store.clone(),
            settings: Arc::new(MailSettingsService::new(store.clone(), resolver.clone())),
            mail: Arc::new(MailService::new(resolver.clone(), store)),
            resolver,
            jwt_validator,
            jwt_issuer: options.jwt_issuer,
            site_title: options.site_title,
        })
    }

    /// The site a path id addresses
    ///
    /// With multi-tenancy off only the root site (id 0) exists.
    pub fn site(&self, id: u64) -> Result<TenantId, ApiError> {
        let tenant_id = TenantId(id);
        if !tenant_id.is_default() && !self.resolver.is_multi_tenant() {
            return Err(ApiError::NotFound(format!(
                "Site {} does not exist; multi-tenancy is disabled",
                tenant_id
            )));
        }
        Ok(tenant_id)
    }
}

/// Where resolved configurations are cached
#[derive(Debug, Clone, PartialEq, Eq)]
enum CacheChoice {
    DynamoDb(String),
    InMemory,
}

/// A shared table unless the process-local cache is explicitly requested
fn cache_choice(table: Option<&str>, in_memory: bool) -> anyhow::Result<CacheChoice> {
    match table.map(str::trim).filter(|t| !t.is_empty()) {
        Some(table) => Ok(CacheChoice::DynamoDb(table.to_string())),
        None if in_memory => Ok(CacheChoice::InMemory),
        None => Err(anyhow!(
            "MAIL_CACHE_TABLE environment variable not set \
             (set MAIL_CACHE_IN_MEMORY=true for a single-instance deployment)"
        )),
    }
}

fn parse_flag(name: &str, value: Option<&str>) -> anyhow::Result<bool> {
    match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("false") | Some("0") => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some(other) => Err(anyhow!("{} must be true or false, got {}", name, other)),
    }
}
