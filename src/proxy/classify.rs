//! Upstream response classification.

use serde_json::Value;

use crate::http::response::ProxyError;

/// Shape of a raw upstream body.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    /// Empty or whitespace only.
    Empty,
    /// Starts with `<` after trimming; an edge/CDN error page.
    Html,
    /// Parsed JSON.
    Json(Value),
}

/// Classify `text` without ever parsing an empty or HTML body.
pub fn classify(text: &str) -> Result<UpstreamBody, serde_json::Error> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(UpstreamBody::Empty);
    }
    if trimmed.starts_with('<') {
        return Ok(UpstreamBody::Html);
    }
    serde_json::from_str(trimmed).map(UpstreamBody::Json)
}

/// Turn an upstream answer into the JSON relayed to the caller.
pub fn relay_body(status: u16, text: &str) -> Result<Value, ProxyError> {
    match classify(text) {
        Ok(UpstreamBody::Json(value)) => Ok(value),
        Ok(UpstreamBody::Empty) => Err(ProxyError::EmptyUpstreamBody { status }),
        Ok(UpstreamBody::Html) => Err(ProxyError::BlockedByUpstream { status }),
        Err(e) => Err(ProxyError::InvalidUpstreamBody {
            status,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_shapes() {
        assert_eq!(classify("").unwrap(), UpstreamBody::Empty);
        assert_eq!(classify(" \r\n\t").unwrap(), UpstreamBody::Empty);
        assert_eq!(classify("<html>blocked</html>").unwrap(), UpstreamBody::Html);
        assert_eq!(classify("\n  <!DOCTYPE html>").unwrap(), UpstreamBody::Html);
        assert_eq!(
            classify(r#"{"object":"payment","id":"pay_123"}"#).unwrap(),
            UpstreamBody::Json(json!({"object": "payment", "id": "pay_123"}))
        );
        assert!(classify("Bad Gateway").is_err());
    }

    #[test]
    fn test_relay_body_errors() {
        assert!(matches!(
            relay_body(200, ""),
            Err(ProxyError::EmptyUpstreamBody { status: 200 })
        ));
        assert!(matches!(
            relay_body(403, "<html>blocked</html>"),
            Err(ProxyError::BlockedByUpstream { status: 403 })
        ));
        assert!(matches!(
            relay_body(503, "Service Unavailable"),
            Err(ProxyError::InvalidUpstreamBody { status: 503, .. })
        ));
    }

    #[test]
    fn test_structured_upstream_error_is_relayed() {
        let body = r#"{"errors":[{"code":"invalid_value","description":"Valor inválido"}]}"#;
        let value = relay_body(400, body).unwrap();
        assert_eq!(value["errors"][0]["code"], "invalid_value");
    }
}
