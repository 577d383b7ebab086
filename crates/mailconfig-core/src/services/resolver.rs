/// Effective mail configuration resolver
use crate::error::MailConfigError;
use crate::models::{ConfigCandidate, ConfigScope, MailConfiguration, StaticMailConfig, TenantId};
use crate::services::cache::{CacheKey, CacheLookup, ConfigCache, InvalidationScope};
use crate::services::completeness::{Completeness, is_complete};
use crate::services::source::{DefaultTenantRecordProvider, TenantRecordSource};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Selects the effective mail configuration for a site
///
/// Precedence is the site's own record, then the root site's record, then
/// the static defaults. Results are cached for 24 hours per site.
pub struct ConfigResolver {
    tenant_source: Arc<dyn TenantRecordSource>,
    default_tenant: Option<Arc<dyn DefaultTenantRecordProvider>>,
    static_config: StaticMailConfig,
    cache: ConfigCache,
    invalidation: InvalidationScope,
}

impl ConfigResolver {
    /// Creates a single-site resolver
    pub fn new(
        tenant_source: Arc<dyn TenantRecordSource>,
        static_config: StaticMailConfig,
        cache: ConfigCache,
    ) -> Self {
        Self {
            tenant_source,
            default_tenant: None,
            static_config,
            cache,
            invalidation: InvalidationScope::default(),
        }
    }

    /// Enables multi-site resolution with the root site as second candidate
    pub fn with_tenancy(mut self, default_tenant: Arc<dyn DefaultTenantRecordProvider>) -> Self {
        self.default_tenant = Some(default_tenant);
        self
    }

    pub fn with_invalidation(mut self, invalidation: InvalidationScope) -> Self {
        self.invalidation = invalidation;
        self
    }

    pub fn is_multi_tenant(&self) -> bool {
        self.default_tenant.is_some()
    }

    pub fn static_config(&self) -> &StaticMailConfig {
        &self.static_config
    }

    pub fn cache_key(&self, tenant_id: TenantId) -> CacheKey {
        if self.is_multi_tenant() {
            CacheKey::for_tenant(tenant_id)
        } else {
            CacheKey::single_site()
        }
    }

    /// Returns the configuration outgoing mail for `tenant_id` should use
    ///
    /// Without tenancy every id maps to the single site's record.
    pub async fn get_effective_mail_config(
        &self,
        tenant_id: TenantId,
    ) -> Result<MailConfiguration, MailConfigError> {
        let key = self.cache_key(tenant_id);

        match self.cache.get(&key).await {
            CacheLookup::Hit(config) => return Ok(config),
            CacheLookup::Miss => {}
            CacheLookup::Unavailable(_) => {
                debug!(tenant_id = %tenant_id, "Resolving without cache");
            }
        }

        let (tenant_record, default_record) = match &self.default_tenant {
            Some(provider) => (
                self.tenant_source.tenant_record(tenant_id).await?,
                provider.default_tenant_record().await?,
            ),
            None => (
                self.tenant_source.tenant_record(TenantId::DEFAULT).await?,
                None,
            ),
        };

        let config = resolve(
            tenant_record.as_ref(),
            default_record.as_ref(),
            &self.static_config,
        )
        .inspect_err(|e| {
            warn!(tenant_id = %tenant_id, error = %e, "Mail configuration is incomplete");
        })?;

        self.cache.set(&key, &config).await;

        Ok(config)
    }

    /// Invalidation hook for a saved settings record
    pub async fn on_mail_settings_written(&self, tenant_id: TenantId) {
        match self.invalidation {
            InvalidationScope::Tenant if !tenant_id.is_default() => {
                self.cache.invalidate(&self.cache_key(tenant_id)).await;
            }
            _ => {
                self.cache.invalidate_all().await;
            }
        }
    }

    /// Invalidation hook for an application-wide flush
    pub async fn on_application_flush(&self) {
        info!("Flushing mail configuration cache");
        self.cache.invalidate_all().await;
    }
}

/// Applies the precedence rules to the fetched candidates
///
/// Fields come from the first complete candidate; with none, each field
/// falls back to the static default of the same name. An incomplete result
/// adopts the static DSN if there is one, is an error if any transport field
/// is set, and is returned as "unconfigured" otherwise.
pub fn resolve(
    tenant_record: Option<&ConfigCandidate>,
    default_record: Option<&ConfigCandidate>,
    static_config: &StaticMailConfig,
) -> Result<MailConfiguration, MailConfigError> {
    let selected = [tenant_record, default_record]
        .into_iter()
        .flatten()
        .find(|candidate| is_complete(Some(&candidate.settings)));

    let mut config = match selected {
        Some(candidate) => {
            debug!(scope = %candidate.scope, "Selected mail configuration");
            candidate.settings.clone()
        }
        None => {
            debug!(scope = %ConfigScope::StaticFallback, "Selected mail configuration");
            static_config.fallback_fields()
        }
    };

    if Completeness::of(Some(&config)).is_complete() {
        return Ok(config);
    }

    if let Some(dsn) = static_config.custom_dsn() {
        config.custom_dsn = Some(dsn.to_string());
        return Ok(config);
    }

    if config.has_any_transport_field() {
        return Err(MailConfigError::IncompleteConfiguration(format!(
            "missing {}",
            missing_fields(&config).join(", ")
        )));
    }

    Ok(config)
}

fn missing_fields(config: &MailConfiguration) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if config.smtp_server().is_none() {
        missing.push("SMTPServer");
    }
    if config.smtp_user().is_none() {
        missing.push("SMTPUser");
    }
    if config.smtp_password().is_none() {
        missing.push("SMTPPassword");
    }
    if config.smtp_port().is_none() {
        missing.push("SMTPPort");
    }
    if config.admin_email().is_none() {
        missing.push("AdminEmail");
    }
    missing
}
