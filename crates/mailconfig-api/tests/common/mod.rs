//! Shared fixtures for API integration tests
#![allow(dead_code)]

use mailconfig_api::auth::JwtValidator;
use mailconfig_api::{ApiContext, ContextOptions};
use mailconfig_core::models::{MailConfiguration, SiteMailSettings, StaticMailConfig};
use mailconfig_core::services::ConfigCache;
use mailconfig_core::services::cache::InMemoryCacheBackend;
use mailconfig_core::services::source::InMemorySettingsStore;
use std::sync::Arc;

/// Key set with a single placeholder RSA key; no test token verifies against it
pub const TEST_JWKS: &str = r#"{"keys":[{"kty":"RSA","kid":"test","n":"AQAB","e":"AQAB"}]}"#;

pub fn validator() -> Arc<JwtValidator> {
    Arc::new(JwtValidator::new(TEST_JWKS).unwrap())
}

pub fn options(multi_tenancy: bool) -> ContextOptions {
    ContextOptions {
        static_config: StaticMailConfig::default(),
        multi_tenancy,
        jwt_issuer: "https://auth.example.com".to_string(),
        site_title: "Example Site".to_string(),
        ..Default::default()
    }
}

/// A context over an in-memory store, returned with the store and cache
pub fn context(
    records: Vec<SiteMailSettings>,
    multi_tenancy: bool,
) -> (
    Arc<ApiContext>,
    Arc<InMemorySettingsStore>,
    Arc<InMemoryCacheBackend>,
) {
    let store = Arc::new(InMemorySettingsStore::with_records(records));
    let backend = Arc::new(InMemoryCacheBackend::new());
    let ctx = ApiContext::assemble(
        store.clone(),
        ConfigCache::new(backend.clone()),
        validator(),
        options(multi_tenancy),
    );
    (ctx, store, backend)
}

pub fn smtp_config(server: &str) -> MailConfiguration {
    MailConfiguration {
        smtp_server: Some(server.to_string()),
        smtp_port: Some(587),
        smtp_user: Some("mailer".to_string()),
        smtp_password: Some("stored-secret".to_string()),
        admin_email: Some(format!("admin@{}", server)),
        admin_name: None,
        custom_dsn: None,
    }
}
