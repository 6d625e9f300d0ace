//! The forwarding handler.
//!
//! # Responsibilities
//! - Resolve the credential before any upstream call
//! - Build the upstream request (URL, `access_token`, JSON headers, body)
//! - Bound the call with a deadline; capture status and text regardless of status
//! - Classify the body and relay it or translate it into a gateway error
//!
//! # Design Decisions
//! - Exactly one upstream attempt per inbound request
//! - Non-2xx upstream status is not an error by itself
//! - Timeouts are reported like any other network failure (502)

use std::time::{Duration, Instant};

use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    StatusCode,
};
use serde_json::Value;
use url::Url;

use crate::config::UpstreamConfig;
use crate::http::request::ProxyRequest;
use crate::http::response::ProxyError;
use crate::proxy::classify::relay_body;
use crate::routing::UpstreamTarget;
use crate::security::credential::{redact, Credentials};

/// Header the upstream API reads the key from.
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// A relayed upstream answer.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Stateless forwarder shared by all requests.
#[derive(Debug, Clone)]
pub struct Forwarder {
    client: reqwest::Client,
    base_url: Url,
    credentials: Credentials,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(
        config: &UpstreamConfig,
        credentials: Credentials,
    ) -> Result<Self, ProxyError> {
        let base_url = Url::parse(config.effective_base_url())
            .map_err(|e| ProxyError::Internal(format!("invalid upstream base URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ProxyError::Internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Forward `request` to the upstream path `segments` and classify the answer.
    pub async fn forward(
        &self,
        request: &ProxyRequest,
        segments: &[String],
    ) -> Result<UpstreamReply, ProxyError> {
        let (key, source) = self.credentials.resolve(request.credential.as_deref())?;
        let body = request.outbound_body()?;
        let target = UpstreamTarget::build(&self.base_url, segments, &request.path.query);

        tracing::info!(
            request_id = %request.request_id,
            method = %request.method,
            upstream_path = %target.path(),
            key = %redact(&key),
            key_source = ?source,
            "Forwarding request"
        );

        let mut outbound = self
            .client
            .request(request.method.clone(), target.url().clone())
            .header(ACCESS_TOKEN_HEADER, key)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(body) = body {
            outbound = outbound.body(body);
        }

        let start = Instant::now();
        let call = async {
            let response = outbound.send().await?;
            let status = response.status();
            let text = response.text().await?;
            Ok::<_, reqwest::Error>((status, text))
        };

        let (status, text) = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                return Err(ProxyError::Upstream {
                    message: describe(&e),
                    url: target.as_str().to_string(),
                })
            }
            Err(_) => {
                return Err(ProxyError::Timeout {
                    timeout: self.timeout,
                    url: target.as_str().to_string(),
                })
            }
        };

        tracing::debug!(
            request_id = %request.request_id,
            status = %status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Upstream answered"
        );

        if status.as_u16() >= 400 {
            tracing::warn!(
                request_id = %request.request_id,
                status = %status,
                body = %text,
                "Upstream returned an error status"
            );
        }

        let body = relay_body(status.as_u16(), &text)?;
        Ok(UpstreamReply { status, body })
    }
}

/// Human-readable reqwest failure, including the root cause.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
