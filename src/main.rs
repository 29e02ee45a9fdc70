//! Media Ratings API server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout, body limit)
//!                         │
//!                         ▼
//!                     routing (exact "METHOD:path" index, then ordered templates)
//!                         │
//!                         ▼
//!                     api handler ──▶ auth::gate ──▶ auth::token (HMAC-SHA256)
//!                         │                │
//!                         │                ▼
//!                         │            accounts (IdentityLookup)
//!                         ▼
//!     ◀────────────── JSON response ({"message": ..} on errors)
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use media_ratings::accounts::{AccountStore, Sha256PasswordHasher};
use media_ratings::api::{build_routes, AppContext};
use media_ratings::auth::{AuthGate, TokenCodec};
use media_ratings::config::{load_config, load_default_config, validate_config, ConfigError};
use media_ratings::http::HttpServer;
use media_ratings::lifecycle::{wait_for_termination, Shutdown};
use media_ratings::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "media-ratings")]
#[command(about = "Media Ratings Platform API server", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long, env = "MEDIA_RATINGS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => load_default_config()?,
    };
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability);
    tracing::info!("media-ratings v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        token_ttl_secs = config.auth.token_ttl_secs,
        request_timeout_secs = config.timeouts.request_secs,
        config_file = ?args.config,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let accounts = AccountStore::new();
    let codec = TokenCodec::new(config.auth.token_secret.as_bytes());
    let context = AppContext {
        gate: AuthGate::new(codec, Arc::new(accounts.clone())),
        accounts,
        hasher: Arc::new(Sha256PasswordHasher),
        token_ttl: config.auth.token_ttl(),
    };
    let server = HttpServer::new(&config, build_routes(&context));

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let mut serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::select! {
        _ = wait_for_termination() => {
            shutdown.trigger();
            serving.await??;
        }
        result = &mut serving => result??,
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
