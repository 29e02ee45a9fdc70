//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → server.rs dispatch_handler (buffer body, route table lookup)
//!     → request.rs (ApiRequest with path params → handler)
//!     → response.rs (JSON body or {"message": ..})
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{handler, ApiRequest, Handler, X_REQUEST_ID};
pub use response::{json_body, json_message};
pub use server::HttpServer;
