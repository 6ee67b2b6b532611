//! Authentication seam.
//!
//! Business modules do NOT depend on any specific auth module.
//! They only know this trait. The concrete implementation is injected
//! at startup time.

use std::sync::Arc;

use axum::extract::FromRef;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::Serialize;

use crate::ServiceError;

/// The identity behind a validated bearer credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub name: String,
    /// Session backing the presented token; revoking it ends the login.
    pub session_id: String,
}

/// Pluggable authenticator. Called for every endpoint that requires a
/// bearer credential (handlers taking [`Authenticated`]).
pub trait Authenticator: Send + Sync + 'static {
    /// Authenticate a request from its headers.
    ///
    /// Returns the caller's [`Principal`], or `ServiceError::Unauthorized`.
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError>;
}

/// A no-op authenticator that lets everyone in as a fixed principal.
/// Used for testing.
pub struct AllowAll;

impl Authenticator for AllowAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Ok(Principal {
            user_id: "test".into(),
            name: "Test".into(),
            session_id: "test".into(),
        })
    }
}

/// An authenticator that denies everything. Used for testing.
pub struct DenyAll;

impl Authenticator for DenyAll {
    fn authenticate(&self, _headers: &HeaderMap) -> Result<Principal, ServiceError> {
        Err(ServiceError::Unauthorized("Unauthenticated.".into()))
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Extractor for handlers that require a valid bearer credential.
///
/// The router state must expose an `Arc<dyn Authenticator>` via `FromRef`.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    Arc<dyn Authenticator>: FromRef<S>,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let authenticator = Arc::<dyn Authenticator>::from_ref(state);
        authenticator.authenticate(&parts.headers).map(Authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer abc.def".parse().unwrap());
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert("authorization", "Basic xyz".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);

        headers.insert("authorization", "Bearer ".parse().unwrap());
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn allow_and_deny() {
        let headers = HeaderMap::new();
        assert!(AllowAll.authenticate(&headers).is_ok());
        assert!(matches!(
            DenyAll.authenticate(&headers),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
