/// Cache maintenance endpoint
use axum::{Extension, Json, extract::State};
use mailconfig_core::utils::logging::redact_email;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::{auth::UserClaims, context::ApiContext, error::ApiError};

#[derive(Debug, Serialize)]
pub struct FlushResponse {
    pub flushed: bool,
}

/// Drops every cached configuration
pub async fn flush(
    State(ctx): State<Arc<ApiContext>>,
    Extension(user): Extension<UserClaims>,
) -> Result<Json<FlushResponse>, ApiError> {
    info!(user = %redact_email(&user.0.email), "Cache flush requested");

    ctx.resolver.on_application_flush().await;

    Ok(Json(FlushResponse { flushed: true }))
}
