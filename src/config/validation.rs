//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check route templates only use parameters their pattern captures
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::Method;
use url::Url;

use crate::config::schema::ProxyConfig;
use crate::routing::matcher::PathPattern;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid upstream base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("unknown ASAAS_ENV '{0}' (expected production or sandbox)")]
    UnknownEnvironment(String),

    #[error("invalid PORT '{0}'")]
    InvalidPort(String),

    #[error("unknown LOG_FORMAT '{0}' (expected pretty or json)")]
    UnknownLogFormat(String),

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("timeouts.request_secs ({request_secs}s) must exceed upstream.request_timeout_secs ({upstream_secs}s)")]
    RequestDeadlineTooShort { request_secs: u64, upstream_secs: u64 },

    #[error("routing prefix '{0}' must start with '/'")]
    InvalidPrefix(String),

    #[error("route {method} '{path}' must start with '/'")]
    InvalidRoutePath { method: String, path: String },

    #[error("route method '{0}' is not supported")]
    UnsupportedMethod(String),

    #[error("route '{pattern}' upstream template uses ':{param}' which the pattern does not capture")]
    UnboundParameter { pattern: String, param: String },

    #[error("credential sentinel '{0}' must not be alphanumeric")]
    AlphanumericSentinel(char),
}

/// Methods the proxy accepts.
pub const SUPPORTED_METHODS: [Method; 6] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::OPTIONS,
];

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base_url = config.upstream.effective_base_url();
    match Url::parse(base_url) {
        Ok(url) if !url.cannot_be_a_base() => {}
        _ => errors.push(ValidationError::InvalidBaseUrl(base_url.to_string())),
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.request_timeout_secs"));
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("timeouts.request_secs"));
    } else if config.timeouts.request_secs <= config.upstream.request_timeout_secs {
        // The upstream deadline must fire first so slow calls answer 502.
        errors.push(ValidationError::RequestDeadlineTooShort {
            request_secs: config.timeouts.request_secs,
            upstream_secs: config.upstream.request_timeout_secs,
        });
    }

    if !config.routing.prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix(config.routing.prefix.clone()));
    }

    for route in &config.routing.routes {
        let supported = route
            .method
            .parse::<Method>()
            .map(|m| SUPPORTED_METHODS.contains(&m) && m != Method::OPTIONS)
            .unwrap_or(false);
        if !supported {
            errors.push(ValidationError::UnsupportedMethod(route.method.clone()));
        }

        for path in [&route.pattern, &route.upstream] {
            if !path.starts_with('/') {
                errors.push(ValidationError::InvalidRoutePath {
                    method: route.method.clone(),
                    path: path.clone(),
                });
            }
        }

        let pattern = PathPattern::parse(&route.pattern);
        for param in PathPattern::parse(&route.upstream).params() {
            if !pattern.params().any(|p| p == param) {
                errors.push(ValidationError::UnboundParameter {
                    pattern: route.pattern.clone(),
                    param: param.to_string(),
                });
            }
        }
    }

    if config.credential.sentinel.is_alphanumeric() {
        errors.push(ValidationError::AlphanumericSentinel(config.credential.sentinel));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
