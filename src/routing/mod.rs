//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, URI)
//!     → target.rs (logical segments + query, routing parameter removed)
//!     → router.rs (local endpoint, route table, or fallback)
//!     → matcher.rs (evaluate `:param` patterns, render upstream template)
//!     → target.rs (upstream URL)
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse patterns and methods
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: first table entry that matches wins
//! - Paths outside the prefix never reach upstream

pub mod matcher;
pub mod router;
pub mod target;

pub use router::{Dispatch, Router};
pub use target::{LogicalPath, QueryPair, UpstreamTarget};
