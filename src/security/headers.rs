//! CORS response headers and preflight handling.
//!
//! # Responsibilities
//! - Allow any origin, the proxied methods, and the credential header
//! - Answer OPTIONS on any path with 204 and no body
//!
//! # Design Decisions
//! - Headers are set by an outer layer so error responses carry them too
//! - Preflight short-circuits before routing, so the route table is irrelevant

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderValue, Method, Request, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";

/// Allowed request headers, including the configured credential header.
pub fn allow_headers(credential_header: &str) -> String {
    format!("Content-Type, Accept, {}", credential_header)
}

/// Wrap `router` with the CORS response headers.
pub fn apply_cors<S>(router: Router<S>, credential_header: &str) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let allow_headers = HeaderValue::from_str(&allow_headers(credential_header))
        .unwrap_or_else(|_| HeaderValue::from_static("Content-Type, Accept"));

    router
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            allow_headers,
        ))
}

/// Answer CORS preflight requests without touching the route table.
pub async fn preflight_middleware(request: Request<Body>, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::NO_CONTENT.into_response();
    }
    next.run(request).await
}
