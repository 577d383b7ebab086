/// Resolution precedence, fallback and caching across the public API
#[path = "common/mod.rs"]
mod common;

use common::{MockDefaultSource, MockTenantSource, global_candidate, smtp_config, tenant_candidate};
use mailconfig_core::error::MailConfigError;
use mailconfig_core::models::{MailConfiguration, StaticMailConfig, TenantId};
use mailconfig_core::services::{ConfigCache, ConfigResolver};
use std::sync::Arc;

fn multi_site(
    tenant: MockTenantSource,
    default: MockDefaultSource,
    fallback: StaticMailConfig,
) -> ConfigResolver {
    ConfigResolver::new(Arc::new(tenant), fallback, ConfigCache::in_memory())
        .with_tenancy(Arc::new(default))
}

fn static_smtp() -> StaticMailConfig {
    StaticMailConfig {
        smtp_server: Some("static.example.com".to_string()),
        smtp_port: Some(25),
        smtp_user: Some("static".to_string()),
        smtp_password: Some("static-pw".to_string()),
        admin_email: Some("noreply@static.example.com".to_string()),
        admin_name: None,
        custom_dsn: None,
    }
}

#[tokio::test]
async fn complete_tenant_record_takes_precedence() {
    let mut tenant = MockTenantSource::new();
    tenant
        .expect_tenant_record()
        .returning(|id| Ok(Some(tenant_candidate(id.0, smtp_config("tenant.example.com")))));
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .returning(|| Ok(Some(global_candidate(smtp_config("root.example.com")))));

    let resolver = multi_site(tenant, default, static_smtp());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert_eq!(config, smtp_config("tenant.example.com"));
}

#[tokio::test]
async fn missing_tenant_record_falls_back_to_root_site() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|_| Ok(None));
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .returning(|| Ok(Some(global_candidate(smtp_config("root.example.com")))));

    let resolver = multi_site(tenant, default, static_smtp());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert_eq!(config, smtp_config("root.example.com"));
}

#[tokio::test]
async fn no_records_use_static_defaults() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|_| Ok(None));
    let mut default = MockDefaultSource::new();
    default.expect_default_tenant_record().returning(|| Ok(None));

    let resolver = multi_site(tenant, default, static_smtp());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert_eq!(config.smtp_server(), Some("static.example.com"));
    assert_eq!(config.smtp_password(), Some("static-pw"));
}

#[tokio::test]
async fn dsn_only_record_is_complete() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|id| {
        Ok(Some(tenant_candidate(
            id.0,
            MailConfiguration {
                custom_dsn: Some("smtps://relay.example.com:465".to_string()),
                ..Default::default()
            },
        )))
    });
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .returning(|| Ok(Some(global_candidate(smtp_config("root.example.com")))));

    let resolver = multi_site(tenant, default, static_smtp());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert_eq!(config.custom_dsn(), Some("smtps://relay.example.com:465"));
    assert_eq!(config.smtp_server(), None);
}

#[tokio::test]
async fn partial_configuration_is_an_error() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|id| {
        Ok(Some(tenant_candidate(
            id.0,
            MailConfiguration {
                smtp_server: Some("tenant.example.com".to_string()),
                ..Default::default()
            },
        )))
    });
    let mut default = MockDefaultSource::new();
    default.expect_default_tenant_record().returning(|| Ok(None));

    // The incomplete record is skipped, so the static fields decide
    let resolver = multi_site(
        tenant,
        default,
        StaticMailConfig {
            smtp_server: Some("static.example.com".to_string()),
            ..Default::default()
        },
    );

    let result = resolver.get_effective_mail_config(TenantId(4)).await;
    assert!(matches!(
        result,
        Err(MailConfigError::IncompleteConfiguration(_))
    ));
}

#[tokio::test]
async fn partial_site_record_without_static_defaults_is_unconfigured() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|id| {
        Ok(Some(tenant_candidate(
            id.0,
            MailConfiguration {
                smtp_server: Some("tenant.example.com".to_string()),
                smtp_user: Some("mailer".to_string()),
                ..Default::default()
            },
        )))
    });
    let mut default = MockDefaultSource::new();
    default.expect_default_tenant_record().returning(|| Ok(None));

    let resolver = multi_site(tenant, default, StaticMailConfig::default());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    // The partial record is never merged into the result
    assert_eq!(config, MailConfiguration::default());
    assert!(!mailconfig_core::services::is_complete(Some(&config)));
}

#[tokio::test]
async fn wholly_empty_configuration_is_valid() {
    let mut tenant = MockTenantSource::new();
    tenant
        .expect_tenant_record()
        .returning(|id| Ok(Some(tenant_candidate(id.0, MailConfiguration::default()))));
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .returning(|| Ok(Some(global_candidate(MailConfiguration::default()))));

    let resolver = multi_site(tenant, default, StaticMailConfig::default());
    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert!(config.is_empty());
}

#[tokio::test]
async fn static_dsn_rescues_incomplete_result() {
    let mut tenant = MockTenantSource::new();
    tenant.expect_tenant_record().returning(|_| Ok(None));
    let mut default = MockDefaultSource::new();
    default.expect_default_tenant_record().returning(|| Ok(None));

    let resolver = multi_site(
        tenant,
        default,
        StaticMailConfig {
            smtp_server: Some("static.example.com".to_string()),
            custom_dsn: Some("smtp://relay.internal:25".to_string()),
            ..Default::default()
        },
    );

    let config = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();
    assert_eq!(config.custom_dsn(), Some("smtp://relay.internal:25"));
}

#[tokio::test]
async fn repeated_resolution_reads_records_once() {
    let mut tenant = MockTenantSource::new();
    tenant
        .expect_tenant_record()
        .times(1)
        .returning(|id| Ok(Some(tenant_candidate(id.0, smtp_config("tenant.example.com")))));
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .times(1)
        .returning(|| Ok(None));

    let resolver = multi_site(tenant, default, StaticMailConfig::default());

    let first = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();
    let second = resolver.get_effective_mail_config(TenantId(4)).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn tenants_are_cached_separately() {
    let mut tenant = MockTenantSource::new();
    tenant
        .expect_tenant_record()
        .times(2)
        .returning(|id| {
            Ok(Some(tenant_candidate(
                id.0,
                smtp_config(&format!("site{}.example.com", id.0)),
            )))
        });
    let mut default = MockDefaultSource::new();
    default
        .expect_default_tenant_record()
        .times(2)
        .returning(|| Ok(None));

    let resolver = multi_site(tenant, default, StaticMailConfig::default());

    let one = resolver.get_effective_mail_config(TenantId(1)).await.unwrap();
    let two = resolver.get_effective_mail_config(TenantId(2)).await.unwrap();
    let one_again = resolver.get_effective_mail_config(TenantId(1)).await.unwrap();

    assert_eq!(one.smtp_server(), Some("site1.example.com"));
    assert_eq!(two.smtp_server(), Some("site2.example.com"));
    assert_eq!(one, one_again);
}
