//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject missing, placeholder, or short signing secrets
//! - Validate value ranges (TTL, timeouts, body size)
//! - Validate addresses and log level (bind address may name a host)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{ServiceConfig, MAX_TOKEN_TTL_SECS};

/// Minimum signing secret length in bytes (the HMAC-SHA256 block output size).
pub const MIN_SECRET_LEN: usize = 32;

const PLACEHOLDER_SECRETS: &[&str] = &["CHANGE_ME_IN_PRODUCTION", "changeme", "secret"];
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check `config`, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !is_host_port(&config.listener.bind_address) {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a host:port address", config.listener.bind_address),
        ));
    }

    let secret = &config.auth.token_secret;
    if secret.is_empty() {
        errors.push(ValidationError::new(
            "auth.token_secret",
            "must be set (config file or MEDIA_RATINGS_TOKEN_SECRET)",
        ));
    } else if PLACEHOLDER_SECRETS.iter().any(|p| p.eq_ignore_ascii_case(secret)) {
        errors.push(ValidationError::new("auth.token_secret", "placeholder value"));
    } else if secret.len() < MIN_SECRET_LEN {
        errors.push(ValidationError::new(
            "auth.token_secret",
            format!("must be at least {} bytes", MIN_SECRET_LEN),
        ));
    }

    if config.auth.token_ttl_secs == 0 || config.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
        errors.push(ValidationError::new(
            "auth.token_ttl_secs",
            format!("must be between 1 and {}", MAX_TOKEN_TTL_SECS),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::new("security.max_body_size", "must be greater than 0"));
    }

    let observability = &config.observability;
    if !LOG_LEVELS.contains(&observability.log_level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", observability.log_level),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `ip:port` or `hostname:port`. Hostnames are resolved at bind time, not here.
fn is_host_port(address: &str) -> bool {
    if address.parse::<SocketAddr>().is_ok() {
        return true;
    }
    match address.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty()
                && !host.contains(|c: char| c.is_whitespace() || c == ':' || c == '/')
                && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.auth.token_secret = "0123456789abcdef0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_defaults_with_secret_are_valid() {
        assert_eq!(validate_config(&valid()), Ok(()));
    }

    #[test]
    fn test_missing_secret_rejected() {
        let errors = validate_config(&ServiceConfig::default()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "auth.token_secret");
    }

    #[test]
    fn test_short_and_placeholder_secrets_rejected() {
        let mut config = valid();
        config.auth.token_secret = "short".into();
        assert_eq!(validate_config(&config).unwrap_err()[0].field, "auth.token_secret");

        config.auth.token_secret = "CHANGE_ME_IN_PRODUCTION".into();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].message, "placeholder value");
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.auth.token_ttl_secs = 0;
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".into();

        let fields: Vec<&str> = validate_config(&config)
            .unwrap_err()
            .iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "auth.token_secret",
                "auth.token_ttl_secs",
                "timeouts.request_secs",
                "observability.log_level",
            ]
        );
    }

    #[test]
    fn test_bind_address_accepts_hostnames() {
        let mut config = valid();
        for address in ["localhost:8080", "0.0.0.0:8080", "[::1]:8080", "api.internal:80"] {
            config.listener.bind_address = address.into();
            assert!(validate_config(&config).is_ok(), "{} should be accepted", address);
        }
        for address in ["localhost", ":8080", "localhost:http", "localhost:70000", "a b:80"] {
            config.listener.bind_address = address.into();
            let errors = validate_config(&config).unwrap_err();
            assert_eq!(errors[0].field, "listener.bind_address", "{} should be rejected", address);
        }
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "nowhere".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
