//! Request handlers.
//!
//! Every request lands in [`dispatch`], which asks the routing engine what to
//! do and either answers locally or hands off to the forwarder.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::config::validation::SUPPORTED_METHODS;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyError;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::routing::Dispatch;

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub status: &'static str,
    pub service: String,
    pub environment: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: String,
    pub environment: &'static str,
    pub endpoint: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Serialize)]
pub struct PathEcho {
    pub status: &'static str,
    pub path: String,
}

/// Entry point for every request that is not a CORS preflight.
pub async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let config = &state.config;

    let proxied = match ProxyRequest::extract(
        request,
        config.routing.path_param.as_deref(),
        &config.credential.header,
        config.limits.max_body_size,
    )
    .await
    {
        Ok(proxied) => proxied,
        Err(e) => return e.into_response(),
    };

    if !SUPPORTED_METHODS.contains(&proxied.method) {
        return ProxyError::MethodNotAllowed(proxied.method.to_string()).into_response();
    }

    match state.router.dispatch(&proxied.method, &proxied.path.segments) {
        Dispatch::Root => Json(service_info(&state)).into_response(),
        Dispatch::Health => Json(health(&state)).into_response(),
        Dispatch::Webhook => Json(webhook(&proxied)).into_response(),
        Dispatch::Echo => Json(PathEcho {
            status: "ok",
            path: proxied.path.display(),
        })
        .into_response(),
        Dispatch::NotFound => ProxyError::RouteNotFound {
            path: format!("/{}", proxied.path.display()),
        }
        .into_response(),
        Dispatch::Forward { upstream } => forward(&state, &proxied, &upstream, start).await,
    }
}

async fn forward(
    state: &AppState,
    proxied: &ProxyRequest,
    upstream: &[String],
    start: Instant,
) -> Response {
    let method = proxied.method.as_str();
    match state.forwarder.forward(proxied, upstream).await {
        Ok(reply) => {
            metrics::record_request(method, reply.status.as_u16(), "forwarded", start);
            (reply.status, Json(reply.body)).into_response()
        }
        Err(e) => {
            metrics::record_request(method, e.status_code().as_u16(), e.outcome(), start);
            e.into_response()
        }
    }
}

pub fn service_info(state: &AppState) -> ServiceInfo {
    ServiceInfo {
        status: "ok",
        service: state.config.service_name.clone(),
        environment: state.config.upstream.environment.as_str(),
        version: env!("CARGO_PKG_VERSION"),
    }
}

pub fn health(state: &AppState) -> HealthStatus {
    HealthStatus {
        status: "ok",
        service: state.config.service_name.clone(),
        environment: state.config.upstream.environment.as_str(),
        endpoint: state.forwarder.base_url().to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }
}

/// Acknowledge a webhook delivery. The payload is only logged.
pub fn webhook(proxied: &ProxyRequest) -> WebhookAck {
    match proxied.json_body() {
        Ok(Some(payload)) => {
            let event = payload.get("event").and_then(|e| e.as_str()).unwrap_or("unknown");
            tracing::info!(
                request_id = %proxied.request_id,
                event = %event,
                payload = %payload,
                "Webhook received"
            );
        }
        Ok(None) => {
            tracing::info!(request_id = %proxied.request_id, "Webhook received with empty body");
        }
        Err(_) => {
            tracing::warn!(
                request_id = %proxied.request_id,
                payload = %String::from_utf8_lossy(&proxied.body),
                "Webhook received with non-JSON body"
            );
        }
    }
    WebhookAck { received: true }
}
