//! Request handling and transformation.
//!
//! # Responsibilities
//! - Extract the proxy-relevant parts of an inbound request
//! - Read the body within the configured size limit
//! - Prepare the outbound body for methods that carry one
//!
//! # Design Decisions
//! - Request ID is assigned by middleware before any handler runs
//! - JSON bodies are validated locally; malformed JSON never reaches upstream
//! - Non-JSON bodies are passed through unchanged

use axum::{
    body::{Body, Bytes},
    http::{header::CONTENT_TYPE, HeaderMap, Method, Request},
};
use serde_json::Value;

use crate::http::response::ProxyError;
use crate::routing::LogicalPath;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Correlation ID assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Methods whose body is forwarded upstream.
pub fn carries_body(method: &Method) -> bool {
    method == Method::POST || method == Method::PUT || method == Method::PATCH
}

/// The parts of an inbound request the proxy acts on.
#[derive(Debug, Clone)]
pub struct ProxyRequest {
    pub method: Method,
    pub path: LogicalPath,
    /// Value of the credential header, if sent.
    pub credential: Option<String>,
    pub content_type: Option<String>,
    pub body: Bytes,
    pub request_id: String,
}

impl ProxyRequest {
    /// Split `request` into a [`ProxyRequest`], buffering at most `max_body` bytes.
    pub async fn extract(
        request: Request<Body>,
        path_param: Option<&str>,
        credential_header: &str,
        max_body: usize,
    ) -> Result<Self, ProxyError> {
        let (parts, body) = request.into_parts();

        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let body = axum::body::to_bytes(body, max_body)
            .await
            .map_err(|e| ProxyError::BodyRead(e.to_string()))?;

        Ok(Self {
            path: LogicalPath::from_uri(&parts.uri, path_param)?,
            credential: header(credential_header),
            content_type: header(CONTENT_TYPE.as_str()),
            request_id: request_id(&parts.headers),
            method: parts.method,
            body,
        })
    }

    fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("json"))
            .unwrap_or(true)
    }

    /// Parse the body as JSON, if there is one.
    pub fn json_body(&self) -> Result<Option<Value>, ProxyError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        serde_json::from_slice(&self.body)
            .map(Some)
            .map_err(|e| ProxyError::MalformedBody(e.to_string()))
    }

    /// Body text to send upstream.
    ///
    /// Only POST, PUT and PATCH carry a body. JSON is re-serialized compactly;
    /// other content types pass through unchanged.
    pub fn outbound_body(&self) -> Result<Option<String>, ProxyError> {
        if !carries_body(&self.method) {
            return Ok(None);
        }

        if self.is_json() {
            return self
                .json_body()?
                .map(|value| {
                    serde_json::to_string(&value).map_err(|e| ProxyError::Internal(e.to_string()))
                })
                .transpose();
        }

        if self.body.is_empty() {
            return Ok(None);
        }
        String::from_utf8(self.body.to_vec())
            .map(Some)
            .map_err(|e| ProxyError::MalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::QueryPair;

    async fn extract(request: Request<Body>) -> ProxyRequest {
        ProxyRequest::extract(request, Some("path"), "x-asaas-key", 1024)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_extract_parts() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/asaas/payments?path=ignored&limit=5")
            .header("x-asaas-key", "$aact_header")
            .header(X_REQUEST_ID, "req-1")
            .body(Body::from(r#"{ "value": 10.5, "billingType": "PIX" }"#))
            .unwrap();

        let proxied = extract(request).await;
        assert_eq!(proxied.credential.as_deref(), Some("$aact_header"));
        assert_eq!(proxied.request_id, "req-1");
        assert_eq!(proxied.path.segments, vec!["ignored"]);
        assert_eq!(proxied.path.query, vec![QueryPair::new("limit", "5")]);
        assert_eq!(
            proxied.outbound_body().unwrap().as_deref(),
            Some(r#"{"value":10.5,"billingType":"PIX"}"#)
        );
    }

    #[tokio::test]
    async fn test_get_and_delete_carry_no_body() {
        for method in [Method::GET, Method::DELETE] {
            let request = Request::builder()
                .method(method)
                .uri("/api/asaas/payments/pay_1")
                .body(Body::from(r#"{"ignored":true}"#))
                .unwrap();
            assert_eq!(extract(request).await.outbound_body().unwrap(), None);
        }
    }

    #[tokio::test]
    async fn test_empty_post_body_is_omitted() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/asaas/payments/pay_1/receiveInCash")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract(request).await.outbound_body().unwrap(), None);
    }

    #[tokio::test]
    async fn test_malformed_json_body() {
        let request = Request::builder()
            .method(Method::PUT)
            .uri("/api/asaas/customers/cus_1")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        assert!(matches!(
            extract(request).await.outbound_body(),
            Err(ProxyError::MalformedBody(_))
        ));
    }

    #[tokio::test]
    async fn test_text_body_passes_through() {
        let request = Request::builder()
            .method(Method::PATCH)
            .uri("/api/asaas/notes")
            .header(CONTENT_TYPE, "text/plain")
            .body(Body::from("already serialized"))
            .unwrap();
        assert_eq!(
            extract(request).await.outbound_body().unwrap().as_deref(),
            Some("already serialized")
        );
    }

    #[tokio::test]
    async fn test_body_limit() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/asaas/payments")
            .body(Body::from(vec![b'a'; 2048]))
            .unwrap();
        let result = ProxyRequest::extract(request, None, "x-asaas-key", 1024).await;
        assert!(matches!(result, Err(ProxyError::BodyRead(_))));
    }
}
