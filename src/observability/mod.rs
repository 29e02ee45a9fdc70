//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (request counters, latency histogram, auth rejections)
//!
//! Consumers:
//!     → stdout (pretty for development, JSON for log aggregation)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every request log line
//! - Route label is the template, never the concrete path (bounded cardinality)
//! - Metrics are cheap (atomic increments); recording without an exporter is a no-op

pub mod logging;
pub mod metrics;
