//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Production base URL of the Asaas REST API.
pub const PRODUCTION_BASE_URL: &str = "https://api.asaas.com/v3";

/// Sandbox base URL of the Asaas REST API.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.asaas.com/api/v3";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Human readable service name reported by `/` and `/health`.
    pub service_name: String,

    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream API settings.
    pub upstream: UpstreamConfig,

    /// Credential sources.
    pub credential: CredentialConfig,

    /// Routing prefix, route table and fallback policies.
    pub routing: RoutingConfig,

    /// Timeout configuration for inbound requests.
    pub timeouts: TimeoutConfig,

    /// Inbound size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            service_name: "Gestão Asaas Backend".to_string(),
            listener: ListenerConfig::default(),
            upstream: UpstreamConfig::default(),
            credential: CredentialConfig::default(),
            routing: RoutingConfig::default(),
            timeouts: TimeoutConfig::default(),
            limits: LimitsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Which Asaas environment requests are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AsaasEnvironment {
    #[default]
    Production,
    Sandbox,
}

impl AsaasEnvironment {
    /// Parse the value of `ASAAS_ENV`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" => Some(Self::Production),
            "sandbox" => Some(Self::Sandbox),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Production => "production",
            Self::Sandbox => "sandbox",
        }
    }

    /// Default base URL for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Production => PRODUCTION_BASE_URL,
            Self::Sandbox => SANDBOX_BASE_URL,
        }
    }
}

/// Upstream API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Selects the default base URL.
    pub environment: AsaasEnvironment,

    /// Explicit base URL, overriding the environment default.
    pub base_url: Option<String>,

    /// Deadline for one upstream call (connect, send and body read).
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// User-Agent sent upstream.
    pub user_agent: String,
}

impl UpstreamConfig {
    /// The base URL requests are forwarded to.
    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            environment: AsaasEnvironment::Production,
            base_url: None,
            request_timeout_secs: 15,
            connect_timeout_secs: 5,
            user_agent: "GestaoAsaas/1.0".to_string(),
        }
    }
}

/// Credential sources, in priority order: raw key, plain key, request header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CredentialConfig {
    /// Key stored verbatim (`ASAAS_API_KEY`).
    pub api_key: Option<String>,

    /// Key stored without its leading sentinel (`ASAAS_API_KEY_RAW`).
    pub api_key_raw: Option<String>,

    /// Leading character the upstream key format requires.
    pub sentinel: char,

    /// Request header carrying a per-request key.
    pub header: String,

    /// Accept the request header when no server-side key is configured.
    pub allow_header_fallback: bool,
}

impl Default for CredentialConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_raw: None,
            sentinel: '$',
            header: "x-asaas-key".to_string(),
            allow_header_fallback: true,
        }
    }
}

/// What happens to prefixed paths that match no route table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Forward the remaining path unchanged.
    #[default]
    Passthrough,
    /// Answer 404 without calling upstream.
    NotFound,
}

/// What happens to paths outside the routing prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Answer `{status: "ok", path}`.
    Echo,
    /// Answer 404 with the error envelope.
    #[default]
    NotFound,
}

/// Routing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix that marks a request as a proxy request.
    pub prefix: String,

    /// Query parameter carrying the logical path (serverless catch-all style).
    pub path_param: Option<String>,

    /// Policy for prefixed paths with no route table entry.
    pub fallback: FallbackPolicy,

    /// Policy for paths outside the prefix.
    pub unmatched: UnmatchedPolicy,

    /// Answer `POST <prefix>/webhook` locally.
    pub webhook_enabled: bool,

    /// Route table, checked in order before the fallback.
    pub routes: Vec<RouteConfig>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            prefix: "/api/asaas".to_string(),
            path_param: None,
            fallback: FallbackPolicy::Passthrough,
            unmatched: UnmatchedPolicy::NotFound,
            webhook_enabled: true,
            routes: default_routes(),
        }
    }
}

/// One route table entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method (upper case).
    pub method: String,

    /// Pattern relative to the prefix, e.g. `/payments/:id`.
    pub pattern: String,

    /// Upstream path template, e.g. `/payments/:id`.
    pub upstream: String,
}

impl RouteConfig {
    pub fn new(method: &str, pattern: &str, upstream: &str) -> Self {
        Self {
            method: method.to_string(),
            pattern: pattern.to_string(),
            upstream: upstream.to_string(),
        }
    }
}

/// Routes exposed by the standalone deployment.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("GET", "/balance", "/finance/balance"),
        RouteConfig::new("GET", "/accounts", "/accounts"),
        RouteConfig::new("POST", "/accounts", "/accounts"),
        RouteConfig::new("GET", "/accounts/:id", "/accounts/:id"),
        RouteConfig::new("GET", "/accounts/:id/balance", "/accounts/:id/balance"),
        RouteConfig::new("GET", "/payments", "/payments"),
        RouteConfig::new("POST", "/payments", "/payments"),
        RouteConfig::new("GET", "/payments/:id", "/payments/:id"),
        RouteConfig::new("DELETE", "/payments/:id", "/payments/:id"),
        RouteConfig::new("GET", "/payments/:id/pixQrCode", "/payments/:id/pixQrCode"),
        RouteConfig::new(
            "GET",
            "/payments/:id/identificationField",
            "/payments/:id/identificationField",
        ),
        RouteConfig::new("GET", "/customers", "/customers"),
        RouteConfig::new("POST", "/customers", "/customers"),
        RouteConfig::new("PUT", "/customers/:id", "/customers/:id"),
        RouteConfig::new("DELETE", "/customers/:id", "/customers/:id"),
        RouteConfig::new("GET", "/transfers", "/transfers"),
        RouteConfig::new("POST", "/transfers", "/transfers"),
    ]
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Inbound size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
