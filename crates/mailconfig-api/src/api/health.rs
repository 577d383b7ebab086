/// Health check endpoint
use axum::{Json, extract::State, http::StatusCode};
use mailconfig_core::TenantId;
use mailconfig_core::services::SettingsRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use crate::context::ApiContext;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    pub checks: HealthChecks,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthChecks {
    #[serde(rename = "settingsStore")]
    pub settings_store: String,
    #[serde(rename = "multiTenancy")]
    pub multi_tenancy: bool,
}

/// Health check handler
/// This endpoint does not require authentication
pub async fn handler(
    State(ctx): State<Arc<ApiContext>>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    // Reading the root record proves the store is reachable
    let (healthy, store_status) = match ctx.settings_store.load(TenantId::DEFAULT).await {
        Ok(_) => (true, "ok".to_string()),
        Err(e) => {
            error!(error = %e, "Settings store health check failed");
            (false, "error".to_string())
        }
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: mailconfig_core::VERSION.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks: HealthChecks {
            settings_store: store_status,
            multi_tenancy: ctx.resolver.is_multi_tenant(),
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_structure() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: "2026-01-03T10:00:00Z".to_string(),
            checks: HealthChecks {
                settings_store: "ok".to_string(),
                multi_tenancy: true,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["checks"]["settingsStore"], "ok");
        assert_eq!(json["checks"]["multiTenancy"], true);
    }
}
