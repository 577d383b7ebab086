/// Bearer-token authentication for admin routes
pub mod jwt;

pub use jwt::{Claims, JwtValidator};

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::context::ApiContext;
use crate::error::ApiError;

/// Validated claims, stored in request extensions for downstream handlers
#[derive(Debug, Clone)]
pub struct UserClaims(pub Claims);

/// Rejects requests without a valid bearer token
pub async fn auth_middleware(
    State(ctx): State<Arc<ApiContext>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let token = JwtValidator::extract_token(auth_header).map_err(ApiError::Unauthorized)?;

    let claims = ctx
        .jwt_validator
        .validate(&token, &ctx.jwt_issuer)
        .map_err(|e| {
            warn!(error = %e, "Rejected bearer token");
            ApiError::Unauthorized(e)
        })?;

    let user = UserClaims(claims);
    request.extensions_mut().insert(user.clone());

    let mut response = next.run(request).await;
    response.extensions_mut().insert(user);
    Ok(response)
}
