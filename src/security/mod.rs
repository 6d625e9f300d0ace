//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Request → headers.rs (preflight short-circuit, CORS headers on the way out)
//!     → credential.rs (resolve upstream key: raw config → plain config → header)
//!     → forwarder attaches key as `access_token`
//! ```
//!
//! # Design Decisions
//! - Missing credentials fail before any upstream call
//! - Keys never appear unredacted in logs

pub mod credential;
pub mod headers;

pub use credential::{redact, restore_sentinel, Credentials, KeySource};
