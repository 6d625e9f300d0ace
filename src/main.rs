//! Asaas forwarding proxy.
//!
//! Forwards `/api/asaas/*` calls to the Asaas REST API with the server-side
//! access token attached, normalizing CORS and error responses.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id / trace / CORS / preflight
//!                         │
//!                         ▼
//!                     dispatch ──▶ routing (prefix, route table, fallback)
//!                         │
//!            ┌────────────┼──────────────┐
//!            ▼            ▼              ▼
//!      local answer   forwarder ──▶  Asaas API
//!      (/, /health,   credential,
//!       webhook)      deadline,
//!                     classify
//!                         │
//!     Client Response     ▼
//!     ◀────────────── relayed JSON or error envelope
//! ```

use std::path::PathBuf;

use clap::Parser;

use asaas_proxy::lifecycle::{signals, startup};
use asaas_proxy::observability::{self, metrics};
use asaas_proxy::Shutdown;

#[derive(Parser)]
#[command(name = "asaas-proxy")]
#[command(about = "Forwarding proxy for the Asaas payments API", long_about = None)]
struct Args {
    /// Optional TOML configuration file; environment variables override it.
    #[arg(short, long, env = "ASAAS_PROXY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = startup::load(args.config.as_deref())?;
    observability::init_logging(&config.observability);

    tracing::info!("asaas-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = startup::start(config).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(signals::forward_signals(shutdown));

    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
