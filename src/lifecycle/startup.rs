//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Build the server state and bind the listener
//! - Log what the proxy is about to serve
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - A missing credential is not fatal; requests may carry the header

use std::net::SocketAddr;
use std::path::Path;

use tokio::net::TcpListener;

use crate::config::{self, ConfigError, ProxyConfig};
use crate::http::{HttpServer, ProxyError};
use crate::security::KeySource;

/// Error type for startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to bind listener: {0}")]
    Bind(#[from] std::io::Error),

    #[error("failed to initialize proxy: {0}")]
    Proxy(#[from] ProxyError),
}

/// Load configuration from the optional file, `.env`, and the environment.
pub fn load(config_path: Option<&Path>) -> Result<ProxyConfig, StartupError> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "Loaded .env file"),
        Err(e) if e.not_found() => {}
        Err(e) => tracing::warn!(error = %e, "Ignoring unreadable .env file"),
    }
    Ok(config::load_from_env(config_path)?)
}

/// Build the server and bind its listener.
pub async fn start(config: ProxyConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    let server = HttpServer::new(config)?;
    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    log_banner(&server, listener.local_addr()?);
    Ok((server, listener))
}

fn log_banner(server: &HttpServer, local_addr: SocketAddr) {
    let config = server.config();
    let forwarder = &server.state().forwarder;

    let credential = match forwarder.credentials().configured_source() {
        Some(KeySource::Raw) => "ASAAS_API_KEY_RAW configured",
        Some(KeySource::Plain) => "ASAAS_API_KEY configured (prefer ASAAS_API_KEY_RAW)",
        Some(KeySource::Header) | None => "not configured; requests must send the key header",
    };

    tracing::info!(
        service = %config.service_name,
        address = %local_addr,
        environment = config.upstream.environment.as_str(),
        upstream = %forwarder.base_url(),
        health = %format!("http://{}/health", local_addr),
        credential = credential,
        "Proxy ready"
    );

    if forwarder.credentials().configured_source().is_none() && !config.credential.allow_header_fallback {
        tracing::warn!("No credential configured and header fallback disabled; every forwarded request will fail with 401");
    }
}
