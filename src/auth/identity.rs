use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

/// Minimal identity record resolved from a token subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: i64,
    pub subject: String,
}

impl Identity {
    pub fn new(id: i64, subject: impl Into<String>) -> Self {
        Self {
            id,
            subject: subject.into(),
        }
    }

    /// Ownership is id equality, nothing more.
    pub fn owns(&self, owner_id: i64) -> bool {
        self.id == owner_id
    }
}

/// Lookup of identities by subject, provided by the persistence layer.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    /// `None` when the subject does not (or no longer) exist.
    async fn find_by_subject(&self, subject: &str) -> Option<Identity>;
}

#[async_trait]
impl<T: IdentityLookup + ?Sized> IdentityLookup for Arc<T> {
    async fn find_by_subject(&self, subject: &str) -> Option<Identity> {
        (**self).find_by_subject(subject).await
    }
}
