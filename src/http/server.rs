//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum service with a single catch-all handler
//! - Wire up middleware (request ID, tracing)
//! - Bound every request by the configured timeout (408 JSON on expiry)
//! - Buffer request bodies up to the configured limit (413 over, 400 unreadable)
//! - Hand every request to the route table and run the matched handler
//! - Map misses to 404 and handler panics to 500
//! - Serve until the shutdown signal fires

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request, StatusCode},
    response::Response,
    Router,
};
use futures_util::FutureExt;
use http_body_util::LengthLimitError;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::request::{ApiRequest, Handler, X_REQUEST_ID};
use crate::http::response::{internal_error, json_message, not_found};
use crate::observability::metrics;
use crate::routing::{RouteMatch, RouteTable};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable<Handler>>,
    pub max_body_size: usize,
    pub request_timeout: Duration,
}

const BODY_TOO_LARGE: &str = "Request body too large";
const BODY_UNREADABLE: &str = "Could not read request body";
const REQUEST_TIMED_OUT: &str = "Request timed out";

/// HTTP server for the media ratings API.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server that dispatches through `routes`.
    pub fn new(config: &ServiceConfig, routes: RouteTable<Handler>) -> Self {
        let state = AppState {
            routes: Arc::new(routes),
            max_body_size: config.security.max_body_size,
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_id = HeaderName::from_static(X_REQUEST_ID);

        Router::new().fallback(dispatch_handler).with_state(state).layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(request_id.clone(), MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::new(request_id)),
        )
    }

    /// The underlying Axum router, for embedding or in-process tests.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the route table.
///
/// The whole exchange (body read plus handler) runs under the request timeout.
async fn dispatch_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let routed = route_request(&state, request, &request_id, start_time);
    match tokio::time::timeout(state.request_timeout, routed).await {
        Ok(response) => response,
        Err(_) => {
            tracing::warn!(
                request_id = %request_id,
                method = %method,
                path = %path,
                timeout_secs = state.request_timeout.as_secs(),
                "Request timed out"
            );
            metrics::record_request(method.as_str(), "timeout", 408, start_time);
            json_message(StatusCode::REQUEST_TIMEOUT, REQUEST_TIMED_OUT)
        }
    }
}

async fn route_request(
    state: &AppState,
    request: Request<Body>,
    request_id: &str,
    start_time: Instant,
) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method;
    let path = parts.uri.path().to_string();

    let Some(RouteMatch {
        handler,
        params,
        template,
        kind,
    }) = state.routes.dispatch(&method, &path)
    else {
        tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
        metrics::record_request(method.as_str(), "unmatched", 404, start_time);
        return not_found();
    };

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = template,
        kind = ?kind,
        "Route matched"
    );

    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let response = if exceeds_length_limit(&e) {
                json_message(StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE)
            } else {
                json_message(StatusCode::BAD_REQUEST, BODY_UNREADABLE)
            };
            tracing::warn!(request_id = %request_id, error = %e, status = response.status().as_u16(), "Failed to read request body");
            metrics::record_request(method.as_str(), template, response.status().as_u16(), start_time);
            return response;
        }
    };

    let api_request = ApiRequest {
        method: method.clone(),
        path: path.clone(),
        headers: parts.headers,
        params,
        body,
        request_id: request_id.to_string(),
    };

    let response = match AssertUnwindSafe(handler.as_ref()(api_request)).catch_unwind().await {
        Ok(response) => response,
        Err(_) => {
            tracing::error!(request_id = %request_id, route = template, "Handler panicked");
            internal_error()
        }
    };

    let status = response.status();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = template,
        status = status.as_u16(),
        "Request handled"
    );
    metrics::record_request(method.as_str(), template, status.as_u16(), start_time);

    response
}

/// True when reading failed because the body exceeded the configured limit,
/// as opposed to the client aborting or sending a broken stream.
fn exceeds_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::handler;
    use crate::http::response::json_body;
    use axum::body::Bytes;
    use tower::ServiceExt;

    async fn explode(_req: ApiRequest) -> Response {
        panic!("handler failure")
    }

    async fn stall(_req: ApiRequest) -> Response {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        json_body(StatusCode::OK, serde_json::json!({}))
    }

    async fn body_len(req: ApiRequest) -> Response {
        json_body(StatusCode::OK, serde_json::json!({ "len": req.body.len() }))
    }

    fn router_with(config: &ServiceConfig) -> Router {
        let mut routes = RouteTable::<Handler>::builder();
        routes.get(
            "/api/media/{id}",
            handler(|req: ApiRequest| async move {
                json_body(StatusCode::OK, serde_json::json!({ "id": req.param("id") }))
            }),
        );
        routes.get("/boom", handler(explode));
        routes.get("/slow", handler(stall));
        routes.post("/upload", handler(body_len));
        HttpServer::new(config, routes.build()).into_router()
    }

    fn test_router() -> Router {
        router_with(&ServiceConfig::default())
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn call(router: Router, method: &str, uri: &str) -> (StatusCode, serde_json::Value) {
        send(
            router,
            Request::builder().method(method).uri(uri).body(Body::empty()).unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn test_dispatches_with_params() {
        let (status, body) = call(test_router(), "GET", "/api/media/42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "id": "42" }));
    }

    #[tokio::test]
    async fn test_unmatched_is_404_json() {
        let (status, body) = call(test_router(), "POST", "/api/media/42").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, serde_json::json!({ "message": "Endpoint not found" }));
    }

    #[tokio::test]
    async fn test_handler_panic_is_500_json() {
        let (status, body) = call(test_router(), "GET", "/boom").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({ "message": "Internal server error" }));
    }

    #[tokio::test]
    async fn test_request_id_propagated() {
        let response = test_router()
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(response.headers().contains_key(X_REQUEST_ID));
    }

    #[tokio::test]
    async fn test_body_within_limit_reaches_handler() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 8;
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .body(Body::from("12345678"))
            .unwrap();
        let (status, body) = send(router_with(&config), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "len": 8 }));
    }

    #[tokio::test]
    async fn test_oversized_body_is_413_json() {
        let mut config = ServiceConfig::default();
        config.security.max_body_size = 8;
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .body(Body::from("123456789"))
            .unwrap();
        let (status, body) = send(router_with(&config), request).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body, serde_json::json!({ "message": "Request body too large" }));
    }

    #[tokio::test]
    async fn test_aborted_body_is_400_json() {
        let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
            Ok(Bytes::from_static(b"{\"partial\"")),
            Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "client went away")),
        ];
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .body(Body::from_stream(futures_util::stream::iter(chunks)))
            .unwrap();
        let (status, body) = send(test_router(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({ "message": "Could not read request body" }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_408_json() {
        let mut config = ServiceConfig::default();
        config.timeouts.request_secs = 1;
        let (status, body) = call(router_with(&config), "GET", "/slow").await;
        assert_eq!(status, StatusCode::REQUEST_TIMEOUT);
        assert_eq!(body, serde_json::json!({ "message": "Request timed out" }));
    }
}
