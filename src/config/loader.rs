//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable that overrides `auth.token_secret`.
pub const TOKEN_SECRET_ENV: &str = "MEDIA_RATINGS_TOKEN_SECRET";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
///
/// The token secret from [`TOKEN_SECRET_ENV`] takes precedence over the file.
pub fn load_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content, std::env::var(TOKEN_SECRET_ENV).ok())
}

/// Built-in defaults plus environment overrides, validated.
pub fn load_default_config() -> Result<ServiceConfig, ConfigError> {
    let mut config = ServiceConfig::default();
    apply_env_overrides(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Parse TOML `content`, apply `secret_override`, then validate.
pub fn parse_config(
    content: &str,
    secret_override: Option<String>,
) -> Result<ServiceConfig, ConfigError> {
    let mut config: ServiceConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    override_token_secret(&mut config, secret_override);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides read from the process environment.
pub fn apply_env_overrides(config: &mut ServiceConfig) {
    override_token_secret(config, std::env::var(TOKEN_SECRET_ENV).ok());
}

/// Replace the token secret when `secret` is present and non-empty.
pub fn override_token_secret(config: &mut ServiceConfig, secret: Option<String>) {
    if let Some(secret) = secret.filter(|s| !s.is_empty()) {
        config.auth.token_secret = secret;
    }
}
