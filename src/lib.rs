//! Media ratings service core: pattern routing, signed bearer tokens, and the
//! authorization gate in front of protected handlers.

// Core subsystems
pub mod auth;
pub mod config;
pub mod http;
pub mod routing;

// Collaborators and endpoints
pub mod accounts;
pub mod api;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use api::{build_routes, AppContext};
pub use config::ServiceConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
