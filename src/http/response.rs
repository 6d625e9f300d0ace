//! Response handling and error translation.
//!
//! # Responsibilities
//! - Define the failure taxonomy of a proxied request
//! - Map each failure class to its HTTP status
//! - Render every failure as the JSON error envelope
//!
//! # Design Decisions
//! - Well-formed upstream JSON errors are not failures; they are relayed
//! - Raw upstream HTML and internal details never reach the client
//! - Gateway failures (shape, network, timeout) all answer 502

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Errors that can occur while handling a proxied request.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// `header` names the per-request key header when the server accepts one.
    #[error("{}", missing_credential_message(.header.as_deref()))]
    MissingCredential { header: Option<String> },

    #[error("Asaas returned an empty response. Check the API key.")]
    EmptyUpstreamBody { status: u16 },

    #[error("Asaas blocked the request (HTML response). The IP may be blocked or a network error occurred.")]
    BlockedByUpstream { status: u16 },

    #[error("Asaas returned a response that is not valid JSON: {reason}")]
    InvalidUpstreamBody { status: u16, reason: String },

    #[error("{message}")]
    Upstream { message: String, url: String },

    #[error("Asaas did not answer within {}s", .timeout.as_secs())]
    Timeout { timeout: Duration, url: String },

    #[error("Request body is not valid JSON: {0}")]
    MalformedBody(String),

    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    #[error("Request URI component '{0}' is not valid percent-encoded UTF-8")]
    InvalidUri(String),

    #[error("Request did not complete within {}s", .0.as_secs())]
    RequestTimeout(Duration),

    #[error("Route not found")]
    RouteNotFound { path: String },

    #[error("Method {0} is not supported")]
    MethodNotAllowed(String),

    #[error("{0}")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status reported to the caller.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential { .. } => StatusCode::UNAUTHORIZED,
            Self::EmptyUpstreamBody { .. }
            | Self::BlockedByUpstream { .. }
            | Self::InvalidUpstreamBody { .. }
            | Self::Upstream { .. }
            | Self::Timeout { .. } => StatusCode::BAD_GATEWAY,
            Self::MalformedBody(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BodyRead(_) | Self::InvalidUri(_) => StatusCode::BAD_REQUEST,
            Self::RequestTimeout(_) => StatusCode::REQUEST_TIMEOUT,
            Self::RouteNotFound { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// True for failures caused by the upstream call or its response shape.
    pub fn is_gateway(&self) -> bool {
        self.status_code() == StatusCode::BAD_GATEWAY
    }

    /// Short label used for metrics.
    pub fn outcome(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "auth_error",
            StatusCode::BAD_GATEWAY => "gateway_error",
            StatusCode::INTERNAL_SERVER_ERROR => "internal_error",
            _ => "client_error",
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        let mut envelope = ErrorEnvelope::new(self.to_string());
        match self {
            Self::EmptyUpstreamBody { status }
            | Self::BlockedByUpstream { status }
            | Self::InvalidUpstreamBody { status, .. } => envelope.status = Some(*status),
            Self::Upstream { url, .. } | Self::Timeout { url, .. } => {
                envelope.asaas_url = Some(url.clone())
            }
            Self::RouteNotFound { path } => envelope.path = Some(path.clone()),
            _ => {}
        }
        envelope
    }
}

fn missing_credential_message(header: Option<&str>) -> String {
    match header {
        Some(header) => format!(
            "Asaas API key is not configured. Set ASAAS_API_KEY_RAW (or ASAAS_API_KEY) on the server or send the {} header.",
            header
        ),
        None => "Asaas API key is not configured. Set ASAAS_API_KEY_RAW (or ASAAS_API_KEY) on the server.".to_string(),
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Proxy error");
        } else {
            tracing::warn!(status = %status, error = %self, "Request rejected");
        }
        (status, Json(self.envelope())).into_response()
    }
}

/// JSON body of every locally generated error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub error: bool,
    pub message: String,
    /// Upstream status, when the failure happened after upstream answered.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asaas_url: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            status: None,
            path: None,
            asaas_url: None,
        }
    }
}
