//! Shared utilities for integration testing.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use media_ratings::accounts::{AccountStore, Sha256PasswordHasher};
use media_ratings::api::{build_routes, AppContext};
use media_ratings::auth::{AuthGate, TokenCodec};
use media_ratings::config::ServiceConfig;
use media_ratings::http::HttpServer;
use media_ratings::lifecycle::Shutdown;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// A server running on an ephemeral port with handles to its collaborators.
pub struct TestServer {
    pub base_url: String,
    pub accounts: AccountStore,
    pub codec: TokenCodec,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    /// Trigger graceful shutdown and wait for the server to exit.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger();
        self.handle.await.unwrap().unwrap();
    }
}

/// Boot the full route table on 127.0.0.1:0.
pub async fn start_server() -> TestServer {
    let mut config = ServiceConfig::default();
    config.auth.token_secret = TEST_SECRET.to_string();

    let accounts = AccountStore::new();
    let codec = TokenCodec::new(TEST_SECRET);
    let context = AppContext {
        gate: AuthGate::new(codec.clone(), Arc::new(accounts.clone())),
        accounts: accounts.clone(),
        hasher: Arc::new(Sha256PasswordHasher),
        token_ttl: TimeDelta::hours(24),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&config, build_routes(&context));

    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestServer {
        base_url: format!("http://{}", addr),
        accounts,
        codec,
        shutdown,
        handle,
    }
}
