//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or built-in defaults
//!     → loader.rs (parse, apply MEDIA_RATINGS_TOKEN_SECRET)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the signing secret never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_default_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, ListenerConfig, ObservabilityConfig, SecurityConfig, ServiceConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
