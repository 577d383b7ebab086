/// Mailconfig API - admin API Lambda for per-site mail settings
///
/// This module contains the REST API handlers for editing mail settings,
/// inspecting the effective configuration and sending test emails.
pub mod api;
pub mod auth;
pub mod context;
pub mod error;
pub mod middleware;

pub use context::{ApiContext, ContextOptions};
pub use error::ApiError;

use axum::{
    Router,
    body::Body as AxumBody,
    http::{Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use lambda_http::{Body, Error as LambdaError, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Builds the `/v1` router over a shared context
pub fn router(ctx: Arc<ApiContext>) -> Router {
    // Routes that require JWT authentication
    let protected = Router::new()
        .route(
            "/tenants/{id}/mail-settings",
            get(api::settings::get_settings).put(api::settings::put_settings),
        )
        .route(
            "/tenants/{id}/mail-settings/test",
            post(api::test_send::send_test),
        )
        .route(
            "/tenants/{id}/mail-config",
            get(api::effective::get_effective_config),
        )
        .route("/cache/flush", post(api::cache::flush))
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&ctx),
            auth::auth_middleware,
        ));

    let v1_router = Router::new()
        // Health endpoint (no auth required)
        .route("/health", get(api::health::handler))
        .merge(protected);

    Router::new()
        .nest("/v1", v1_router)
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        .with_state(ctx)
}

/// Main API handler - converts Lambda HTTP request to Axum router
pub async fn handler(ctx: Arc<ApiContext>, event: Request) -> Result<Response<Body>, LambdaError> {
    info!("Processing API request: {} {}", event.method(), event.uri());

    let app = router(ctx);

    let (parts, body) = event.into_parts();
    let axum_request = http::Request::from_parts(parts, AxumBody::from(body.to_vec()));

    match app.oneshot(axum_request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();

            let body_bytes = axum::body::to_bytes(body, usize::MAX)
                .await
                .unwrap_or_default();

            Ok(Response::from_parts(parts, Body::from(body_bytes.to_vec())))
        }
        Err(err) => {
            error!("Axum router error: {}", err);
            let response = Response::builder().status(500).body(Body::from(
                serde_json::json!({
                    "error": "Internal server error"
                })
                .to_string(),
            ))?;
            Ok(response)
        }
    }
}
