//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_TOKEN_TTL_SECS;

/// Root configuration for the media ratings service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Token signing and lifetime.
    pub auth: AuthConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request limits.
    pub security: SecurityConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Bearer token configuration.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret. Fixed for the process lifetime.
    pub token_secret: String,

    /// Token lifetime in seconds.
    pub token_ttl_secs: u64,
}

/// Upper bound accepted for `token_ttl_secs` (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

impl AuthConfig {
    /// Token lifetime, clamped to [`MAX_TOKEN_TTL_SECS`].
    pub fn token_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(self.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // Must be provided via config file or MEDIA_RATINGS_TOKEN_SECRET.
            token_secret: String::new(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// Timeout configuration.
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

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
