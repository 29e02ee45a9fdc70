//! Structured logging.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - JSON format for production, pretty format for development

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::ObservabilityConfig;

/// Install the global tracing subscriber. Call once, before serving.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(&config.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

fn default_filter(level: &str) -> EnvFilter {
    EnvFilter::new(format!("media_ratings={level},tower_http={level}"))
}
