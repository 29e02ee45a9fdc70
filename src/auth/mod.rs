//! Stateless authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Login (after credentials are checked by the caller):
//!     (subject, id, ttl)
//!     → token.rs (JSON claims → base64url → HMAC-SHA256 → "payload.signature")
//!
//! Protected request:
//!     Authorization: Bearer <token>
//!     → gate.rs (header extraction)
//!     → token.rs (signature, payload, expiry)
//!     → identity.rs (external lookup by subject)
//!     → Identity handed to the handler, or 401
//! ```
//!
//! # Design Decisions
//! - No server-side sessions: validity is signature + expiry only
//! - Secret is passed into the codec at construction, never global
//! - Ownership checks compare identity ids, nothing else

pub mod claims;
pub mod gate;
pub mod identity;
pub mod token;

pub use claims::Claims;
pub use gate::{bearer_token, AuthError, AuthGate};
pub use identity::{Identity, IdentityLookup};
pub use token::{TokenCodec, TokenError, DEFAULT_TOKEN_TTL_SECS};
