//! API middleware

use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{info, warn};

use crate::auth::{caller_from_headers, Caller};

/// Caller middleware
///
/// Rejects requests without a valid `X-Caller-Role` header and stores the
/// parsed [`Caller`] in request extensions for handlers and auditing.
pub async fn caller_middleware(mut request: Request<Body>, next: Next) -> Response {
    match caller_from_headers(request.headers()) {
        Ok(caller) => {
            request.extensions_mut().insert(caller);
            next.run(request).await
        }
        Err(e) => {
            warn!(uri = %request.uri(), "Rejected request: {}", e);
            e.into_response()
        }
    }
}

/// Audit logging middleware
///
/// Logs every API request with the caller's role, status and duration
pub async fn audit_middleware(request: Request<Body>, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let role = request
        .extensions()
        .get::<Caller>()
        .map(|c| c.role.as_str())
        .unwrap_or("anonymous");

    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        role = role,
        status = status.as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "API request"
    );

    response
}
