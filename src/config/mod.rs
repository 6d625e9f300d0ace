//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overlay: .env + process env (loader.rs)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc to the request handlers
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup; handlers never read the environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, load_with_env, ConfigError};
pub use schema::{
    AsaasEnvironment, CredentialConfig, FallbackPolicy, ListenerConfig, LogFormat,
    ObservabilityConfig, ProxyConfig, RouteConfig, RoutingConfig, UnmatchedPolicy,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
