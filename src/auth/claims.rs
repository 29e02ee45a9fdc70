use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Facts bound into a token at issuance.
///
/// Serialized as `{"username": .., "userId": .., "exp": ..}`. Never stored
/// server-side; the token string is the only record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity (the username).
    #[serde(rename = "username")]
    pub subject: String,

    /// Numeric identity id.
    #[serde(rename = "userId")]
    pub identity_id: i64,

    /// Expiry, unix epoch seconds.
    #[serde(rename = "exp")]
    pub expires_at: i64,
}

impl Claims {
    pub fn new(subject: impl Into<String>, identity_id: i64, expires_at: i64) -> Self {
        Self {
            subject: subject.into(),
            identity_id,
            expires_at,
        }
    }

    /// Expired strictly before `now`; a token is still valid in its expiry second.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now.timestamp()
    }
}
