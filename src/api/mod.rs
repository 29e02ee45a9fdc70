//! Feature endpoints registered into the route table.
//!
//! # Data Flow
//! ```text
//! main.rs
//!     → AppContext (gate, accounts, hasher, token TTL)
//!     → build_routes (each module's register_routes, in order)
//!     → RouteTable<Handler> handed to HttpServer
//! ```

pub mod system;
pub mod users;

use std::future::Future;
use std::sync::Arc;

use axum::response::Response;
use chrono::TimeDelta;

use crate::accounts::{AccountStore, PasswordHasher};
use crate::auth::AuthGate;
use crate::http::{handler, ApiRequest, Handler};
use crate::routing::RouteTable;

/// Shared collaborators handed to every endpoint.
#[derive(Clone)]
pub struct AppContext {
    pub gate: AuthGate,
    pub accounts: AccountStore,
    pub hasher: Arc<dyn PasswordHasher>,
    pub token_ttl: TimeDelta,
}

/// Register every feature module and freeze the table.
pub fn build_routes(context: &AppContext) -> RouteTable<Handler> {
    let mut routes = RouteTable::builder();
    system::register_routes(&mut routes);
    users::register_routes(&mut routes, context);

    let table = routes.build();
    for route in table.routes() {
        tracing::debug!(method = %route.method(), template = %route.template(), "Route registered");
    }
    tracing::info!(routes = table.len(), "Route table built");
    table
}

/// Bind `f` to a clone of `context` for each request.
fn with_context<F, Fut>(context: &AppContext, f: F) -> Handler
where
    F: Fn(AppContext, ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    let context = context.clone();
    handler(move |request| f(context.clone(), request))
}
