//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, CORS, preflight, timeout)
//! - Bind server to listener
//! - Stop accepting on the shutdown signal

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::handlers::dispatch;
use crate::http::response::ProxyError;
use crate::lifecycle::shutdown;
use crate::proxy::Forwarder;
use crate::routing::Router as ProxyRouter;
use crate::security::credential::Credentials;
use crate::security::headers::{apply_cors, preflight_middleware};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ProxyConfig>,
    pub router: Arc<ProxyRouter>,
    pub forwarder: Arc<Forwarder>,
}

impl AppState {
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let credentials = Credentials::from_config(&config.credential);
        let forwarder = Forwarder::new(&config.upstream, credentials)?;
        let router = ProxyRouter::from_config(&config.routing);

        Ok(Self {
            config: Arc::new(config),
            router: Arc::new(router),
            forwarder: Arc::new(forwarder),
        })
    }
}

/// Replace the timeout layer's bare 408 with the error envelope.
async fn render_request_timeout(State(state): State<AppState>, response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT
        && !response.headers().contains_key(CONTENT_TYPE)
    {
        let deadline = Duration::from_secs(state.config.timeouts.request_secs);
        return ProxyError::RequestTimeout(deadline).into_response();
    }
    response
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let state = AppState::new(config)?;
        let router = Self::build_router(&state);
        Ok(Self { router, state })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(state: &AppState) -> Router {
        let config = &state.config;

        let router = Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state.clone())
            .layer(middleware::from_fn(preflight_middleware))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(middleware::map_response_with_state(
                state.clone(),
                render_request_timeout,
            ));

        apply_cors(router, &config.credential.header)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The configured router, for driving requests without a socket.
    pub fn into_router(self) -> Router {
        self.router
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.state.config
    }
}
