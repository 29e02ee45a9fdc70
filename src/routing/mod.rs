//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     (method, template, handler) triples from each feature module
//!     → matcher.rs (compile template into literal / {param} segments)
//!     → router.rs (literal index + ordered route list)
//!     → Freeze as immutable RouteTable
//!
//! Incoming Request (method, path)
//!     → router.rs (exact "METHOD:path" lookup)
//!     → matcher.rs (ordered template scan on miss)
//!     → Return: handler + PathParams, or None
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Exact literal match takes precedence over any template
//! - Deterministic: first registered template wins, never reordered by specificity

pub mod matcher;
pub mod router;

pub use matcher::{match_path, PathParams, PathTemplate};
pub use router::{MatchKind, Route, RouteMatch, RouteTable, RouteTableBuilder};
