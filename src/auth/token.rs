//! Signed bearer token codec.
//!
//! Wire format: `<payload>.<signature>`, both base64url without padding.
//! `payload` encodes the JSON [`Claims`]; `signature` is HMAC-SHA256 over the
//! payload *text* under the server secret. Verification recomputes the MAC over
//! the received payload text, so no re-serialization happens before comparing.

use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use chrono::{DateTime, TimeDelta, Utc};
use hmac::{digest::InvalidLength, Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use super::claims::Claims;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime used by the service unless configured otherwise (24h).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Reasons a token is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token must contain exactly one '.' separator")]
    Malformed,

    #[error("token signature does not match its payload")]
    InvalidSignature,

    #[error("token payload is not well-formed claims: {0}")]
    InvalidPayload(String),

    #[error("token expired at {expires_at}")]
    Expired { expires_at: i64 },

    #[error("failed to encode token: {0}")]
    Encoding(String),
}

/// Issues and verifies signed tokens with a fixed secret.
///
/// Cloning shares the secret; independent codecs use independent keys.
#[derive(Clone)]
pub struct TokenCodec {
    secret: Arc<[u8]>,
}

impl TokenCodec {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    pub fn issue(&self, subject: &str, identity_id: i64, ttl: TimeDelta) -> Result<String, TokenError> {
        self.issue_at(subject, identity_id, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        subject: &str,
        identity_id: i64,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let expires_at = now.timestamp().saturating_add(ttl.num_seconds());
        self.encode(&Claims::new(subject, identity_id, expires_at))
    }

    /// Sign already-built claims.
    pub fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        let json = serde_json::to_vec(claims).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let payload = BASE64_URL.encode(json);

        let mac = self
            .keyed_mac(&payload)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;
        let signature = BASE64_URL.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", payload, signature))
    }

    /// Verify `token` against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify `token` as if the current time were `now`.
    ///
    /// Checks, in order: shape, signature, payload decoding, expiry.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        if signature.contains('.') {
            return Err(TokenError::Malformed);
        }

        // Strict decoding: non-canonical trailing bits are rejected, so every
        // signature character is significant.
        let provided = BASE64_URL
            .decode(signature)
            .map_err(|_| TokenError::InvalidSignature)?;
        self.keyed_mac(payload)
            .map_err(|_| TokenError::InvalidSignature)?
            .verify_slice(&provided)
            .map_err(|_| TokenError::InvalidSignature)?;

        let json = BASE64_URL
            .decode(payload)
            .map_err(|e| TokenError::InvalidPayload(e.to_string()))?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|e| TokenError::InvalidPayload(e.to_string()))?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired {
                expires_at: claims.expires_at,
            });
        }

        Ok(claims)
    }

    fn keyed_mac(&self, payload: &str) -> Result<HmacSha256, InvalidLength> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("secret", &"<redacted>")
            .finish()
    }
}
