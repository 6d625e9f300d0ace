//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request ID, trace, CORS, preflight)
//!     → handlers.rs (dispatch: local endpoint or forward)
//!     → request.rs (logical path, credential header, body)
//!     → [proxy::Forwarder calls upstream]
//!     → response.rs (relay JSON or render the error envelope)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::{ProxyRequest, X_REQUEST_ID};
pub use response::{ErrorEnvelope, ProxyError};
pub use server::{AppState, HttpServer};
