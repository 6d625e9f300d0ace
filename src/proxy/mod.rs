//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyRequest + Dispatch::Forward
//!     → forward.rs (credential, URL, headers, deadline, single attempt)
//!     → classify.rs (empty / HTML / JSON)
//!     → UpstreamReply (status + JSON) or ProxyError (401 / 502)
//! ```

pub mod classify;
pub mod forward;

pub use classify::{classify, relay_body, UpstreamBody};
pub use forward::{Forwarder, UpstreamReply, ACCESS_TOKEN_HEADER};
