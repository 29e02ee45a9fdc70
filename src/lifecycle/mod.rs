//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_termination returns
//!
//! Shutdown (shutdown.rs):
//!     trigger() → every subscriber (HTTP server) stops accepting and drains
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_termination;
