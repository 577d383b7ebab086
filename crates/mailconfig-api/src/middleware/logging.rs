/// Request logging middleware
use axum::{extract::Request, middleware::Next, response::Response};
use mailconfig_core::utils::logging::redact_email;
use std::time::Instant;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use crate::auth::UserClaims;

/// Wraps each request in a span carrying a generated request id, then logs
/// the admin's identity, the status and the duration
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let span = info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        path = %request.uri().path(),
    );

    async move {
        debug!("Incoming request");

        let response = next.run(request).await;

        let user = identity(&response);
        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_client_error() || status.is_server_error() {
            warn!(user = %user, status = status.as_u16(), duration_ms, "Request failed");
        } else {
            info!(user = %user, status = status.as_u16(), duration_ms, "Request completed");
        }

        response
    }
    .instrument(span)
    .await
}

// The auth layer copies the claims onto the response
fn identity(response: &Response) -> String {
    response
        .extensions()
        .get::<UserClaims>()
        .map(|claims| format!("{} ({})", redact_email(&claims.0.email), claims.0.sub))
        .unwrap_or_else(|| "anonymous".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Claims;

    #[test]
    fn test_identity_is_redacted() {
        let mut response = Response::new(axum::body::Body::empty());
        assert_eq!(identity(&response), "anonymous");

        response.extensions_mut().insert(UserClaims(Claims {
            email: "ops@example.com".to_string(),
            name: String::new(),
            sub: "user-1".to_string(),
            exp: 0,
            iat: 0,
            iss: String::new(),
        }));
        assert_eq!(identity(&response), "***@example.com (user-1)");
    }
}
