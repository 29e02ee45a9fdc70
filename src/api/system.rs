//! Service-level endpoints.

use axum::http::StatusCode;
use axum::response::Response;

use crate::http::{handler, json_message, ApiRequest, Handler};
use crate::routing::RouteTableBuilder;

pub const RUNNING_MESSAGE: &str = "Media Ratings Platform API is running";

pub fn register_routes(routes: &mut RouteTableBuilder<Handler>) {
    routes.get("/", handler(root));
}

async fn root(_request: ApiRequest) -> Response {
    json_message(StatusCode::OK, RUNNING_MESSAGE)
}
