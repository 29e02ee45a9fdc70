//! Request handed to route handlers.
//!
//! # Responsibilities
//! - Carry method, path, headers, and body of the incoming request
//! - Carry the parameter bindings produced by dispatch
//! - Carry the request ID assigned at the edge for log correlation
//!
//! # Design Decisions
//! - Body is buffered (bounded by the configured limit) before dispatch
//! - Handlers are boxed async functions so feature modules can register closures

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use futures_util::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;

use crate::routing::PathParams;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A fully buffered request plus its route bindings.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub params: PathParams,
    pub body: Bytes,
    pub request_id: String,
}

impl ApiRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Deserialize the body as JSON. An empty body is an error.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

pub type HandlerFuture = BoxFuture<'static, Response>;

/// A route handler as stored in the route table.
pub type Handler = Arc<dyn Fn(ApiRequest) -> HandlerFuture + Send + Sync>;

/// Box an async function into a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(ApiRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |request| f(request).boxed())
}
