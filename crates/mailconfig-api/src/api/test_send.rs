/// Test email endpoint
use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use std::sync::Arc;

use crate::{context::ApiContext, error::ApiError};

#[derive(Debug, Serialize)]
pub struct TestSendResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}

/// Sends the test email to the site's stored `TestEmail` address
///
/// Delivery problems are reported in the body with a 200 status.
pub async fn send_test(
    State(ctx): State<Arc<ApiContext>>,
    Path(tenant_id): Path<u64>,
) -> Result<Json<TestSendResponse>, ApiError> {
    let tenant_id = ctx.site(tenant_id)?;
    let outcome = ctx.mail.send_test_email(tenant_id, &ctx.site_title).await;

    Ok(Json(TestSendResponse {
        success: outcome.is_success(),
        message: outcome.message(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
