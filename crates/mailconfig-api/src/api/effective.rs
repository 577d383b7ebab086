/// Effective configuration view
use axum::{
    Json,
    extract::{Path, State},
};
use mailconfig_core::services::TransportFactory;
use mailconfig_core::{MailConfiguration, TenantId};
use serde::Serialize;
use std::sync::Arc;

use crate::{context::ApiContext, error::ApiError};

#[derive(Debug, Serialize)]
pub struct TransportSummary {
    pub kind: String,
    /// DSN with the password masked
    pub dsn: String,
}

#[derive(Debug, Serialize)]
pub struct EffectiveConfigResponse {
    #[serde(rename = "tenantId")]
    pub tenant_id: TenantId,
    #[serde(rename = "cacheKey")]
    pub cache_key: String,
    pub config: MailConfiguration,
    pub transport: TransportSummary,
}

/// The configuration mail from this site is sent with right now
pub async fn get_effective_config(
    State(ctx): State<Arc<ApiContext>>,
    Path(tenant_id): Path<u64>,
) -> Result<Json<EffectiveConfigResponse>, ApiError> {
    let tenant_id = ctx.site(tenant_id)?;

    let config = ctx.resolver.get_effective_mail_config(tenant_id).await?;
    let descriptor = TransportFactory::build_transport_descriptor(&config)?;

    Ok(Json(EffectiveConfigResponse {
        tenant_id,
        cache_key: ctx.resolver.cache_key(tenant_id).to_string(),
        config: config.redacted(),
        transport: TransportSummary {
            kind: descriptor.kind().to_string(),
            dsn: descriptor.redacted_dsn(),
        },
    }))
}
