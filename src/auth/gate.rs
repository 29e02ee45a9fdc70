//! Authorization gate for protected handlers.
//!
//! # Responsibilities
//! - Extract the bearer token from the `Authorization` header
//! - Verify it through the [`TokenCodec`]
//! - Resolve the claims' subject through the external [`IdentityLookup`]
//!
//! # Design Decisions
//! - Single chokepoint: every protected handler calls [`AuthGate::authorize`]
//! - Malformed, forged, expired, and stale tokens share one client-facing message
//! - Fail closed: any doubt is a 401

use std::sync::Arc;

use axum::http::{header::AUTHORIZATION, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::identity::{Identity, IdentityLookup};
use super::token::{TokenCodec, TokenError};
use crate::http::response::json_message;
use crate::observability::metrics;

const BEARER_SCHEME: &str = "Bearer ";

/// Why a request was not authorized.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No header, or a scheme other than `Bearer`.
    #[error("Authentication required")]
    MissingCredentials,

    /// Token failed shape, signature, payload, or expiry checks.
    #[error("Invalid or expired token")]
    InvalidToken(#[source] TokenError),

    /// Token is valid but its subject no longer resolves.
    #[error("Invalid or expired token")]
    UnknownSubject(String),
}

impl AuthError {
    /// Label used for logs and metrics; never sent to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingCredentials => "missing_credentials",
            AuthError::InvalidToken(TokenError::Expired { .. }) => "expired_token",
            AuthError::InvalidToken(_) => "invalid_token",
            AuthError::UnknownSubject(_) => "unknown_subject",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        json_message(StatusCode::UNAUTHORIZED, self.to_string())
    }
}

/// Extract the token following a `Bearer ` prefix.
///
/// The scheme word is matched case-insensitively; exactly one space separates
/// it from the token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let scheme = value.get(..BEARER_SCHEME.len())?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    Some(&value[BEARER_SCHEME.len()..])
}

/// Verifies bearer tokens and resolves them to identities.
#[derive(Clone)]
pub struct AuthGate {
    codec: TokenCodec,
    identities: Arc<dyn IdentityLookup>,
}

impl AuthGate {
    pub fn new(codec: TokenCodec, identities: Arc<dyn IdentityLookup>) -> Self {
        Self { codec, identities }
    }

    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Authorize a request by its headers.
    pub async fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        self.authorize_at(headers, Utc::now()).await
    }

    /// Authorize as if the current time were `now`.
    pub async fn authorize_at(
        &self,
        headers: &HeaderMap,
        now: DateTime<Utc>,
    ) -> Result<Identity, AuthError> {
        let result = self.resolve(headers, now).await;
        if let Err(err) = &result {
            tracing::debug!(reason = err.reason(), error = ?err, "Request not authorized");
            metrics::record_auth_rejection(err.reason());
        }
        result
    }

    async fn resolve(&self, headers: &HeaderMap, now: DateTime<Utc>) -> Result<Identity, AuthError> {
        let token = bearer_token(headers)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredentials)?;

        let claims = self
            .codec
            .verify_at(token, now)
            .map_err(AuthError::InvalidToken)?;

        let identity = self
            .identities
            .find_by_subject(&claims.subject)
            .await
            .ok_or_else(|| AuthError::UnknownSubject(claims.subject.clone()))?;

        // A re-created account under the same name is a different identity.
        if identity.id != claims.identity_id {
            tracing::warn!(
                subject = %claims.subject,
                token_id = claims.identity_id,
                current_id = identity.id,
                "Token identity id does not match current identity"
            );
            return Err(AuthError::UnknownSubject(claims.subject));
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use chrono::TimeDelta;

    struct StaticLookup(Vec<Identity>);

    #[async_trait]
    impl IdentityLookup for StaticLookup {
        async fn find_by_subject(&self, subject: &str) -> Option<Identity> {
            self.0.iter().find(|i| i.subject == subject).cloned()
        }
    }

    fn gate(identities: Vec<Identity>) -> AuthGate {
        AuthGate::new(
            TokenCodec::new("gate-test-secret-gate-test-secret"),
            Arc::new(StaticLookup(identities)),
        )
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("BEARER abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Bearer  abc")), Some(" abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearerabc")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn test_valid_token_resolves_identity() {
        let gate = gate(vec![Identity::new(7, "alice")]);
        let token = gate.codec().issue("alice", 7, TimeDelta::hours(24)).unwrap();

        let identity = gate.authorize(&headers(&format!("Bearer {}", token))).await.unwrap();
        assert_eq!(identity, Identity::new(7, "alice"));
        assert!(identity.owns(7));
        assert!(!identity.owns(8));
    }

    #[tokio::test]
    async fn test_missing_or_wrong_scheme() {
        let gate = gate(vec![Identity::new(7, "alice")]);
        assert_eq!(gate.authorize(&HeaderMap::new()).await, Err(AuthError::MissingCredentials));
        assert_eq!(
            gate.authorize(&headers("Token abc.def")).await,
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            gate.authorize(&headers("Bearer ")).await,
            Err(AuthError::MissingCredentials)
        );
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid() {
        let gate = gate(vec![Identity::new(7, "alice")]);
        let err = gate.authorize(&headers("Bearer abc.def")).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(_)));
        assert_eq!(err.to_string(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let gate = gate(vec![Identity::new(7, "alice")]);
        let token = gate.codec().issue("alice", 7, TimeDelta::hours(1)).unwrap();
        let later = Utc::now() + TimeDelta::hours(2);

        let err = gate
            .authorize_at(&headers(&format!("Bearer {}", token)), later)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken(TokenError::Expired { .. })));
        assert_eq!(err.reason(), "expired_token");
    }

    #[tokio::test]
    async fn test_unknown_subject_rejected() {
        let gate = gate(vec![]);
        let token = gate.codec().issue("ghost", 3, TimeDelta::hours(1)).unwrap();
        let err = gate
            .authorize(&headers(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnknownSubject("ghost".into()));
        assert_eq!(err.to_string(), "Invalid or expired token");
    }

    #[tokio::test]
    async fn test_recreated_subject_rejected() {
        let gate = gate(vec![Identity::new(9, "alice")]);
        let token = gate.codec().issue("alice", 7, TimeDelta::hours(1)).unwrap();
        let err = gate
            .authorize(&headers(&format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::UnknownSubject("alice".into()));
    }

    #[tokio::test]
    async fn test_rejection_response_is_401_json() {
        let response = AuthError::MissingCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({"message": "Authentication required"}));
    }
}
