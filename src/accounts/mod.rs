//! In-process account collaborator.
//!
//! The authentication core only sees [`IdentityLookup`](crate::auth::IdentityLookup);
//! this module provides the store and password hashing the binary ships with.
//! Deployments with a real database plug their own types behind the same traits.

pub mod password;
pub mod store;

pub use password::{PasswordHasher, Sha256PasswordHasher};
pub use store::{Account, AccountError, AccountStore};
