pub mod schema;
pub mod password;
pub mod user;
pub mod session;

use std::sync::Arc;

use axum::http::HeaderMap;
use thiserror::Error;
use tracing::debug;

use polyglot_core::{Authenticator, FieldErrors, Principal, ServiceError, bearer_token};
use polyglot_sql::{SQLError, SQLStore};

pub use password::{hash_password, verify_password};

/// Auth service error type.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(FieldErrors),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<SQLError> for AuthError {
    fn from(e: SQLError) -> Self {
        AuthError::Storage(e.to_string())
    }
}

impl From<AuthError> for ServiceError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::NotFound(m) => ServiceError::NotFound(m),
            AuthError::Validation(errors) => ServiceError::Validation(errors),
            AuthError::Unauthorized(_) => ServiceError::Unauthorized("Unauthenticated.".into()),
            AuthError::Storage(m) => ServiceError::Storage(m),
            AuthError::Internal(m) => ServiceError::Internal(m),
        }
    }
}

/// Configuration for the auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret (HS256).
    pub jwt_secret: String,
    /// Token lifetime in seconds (default: 24h).
    pub token_ttl: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "polyglot-dev-secret-change-me".to_string(),
            token_ttl: 86400,
        }
    }
}

/// The Auth service: users, sessions and bearer tokens.
pub struct AuthService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: AuthConfig,
}

impl AuthService {
    /// Create a new AuthService, initializing the DB schema.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Arc<Self>, AuthError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }
}

impl Authenticator for AuthService {
    fn authenticate(&self, headers: &HeaderMap) -> Result<Principal, ServiceError> {
        let token = bearer_token(headers)
            .ok_or_else(|| ServiceError::Unauthorized("Unauthenticated.".into()))?;
        let claims = self.verify_token(token).map_err(|e| {
            debug!("Rejected bearer token: {}", e);
            ServiceError::from(e)
        })?;
        Ok(Principal {
            user_id: claims.sub,
            name: claims.name,
            session_id: claims.sid,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use polyglot_sql::SqliteStore;

    use super::{AuthConfig, AuthService};
    use crate::model::{CreateUser, User};

    pub(crate) fn test_service_with(config: AuthConfig) -> Arc<AuthService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        AuthService::new(sql, config).unwrap()
    }

    pub(crate) fn test_service() -> Arc<AuthService> {
        test_service_with(AuthConfig::default())
    }

    pub(crate) fn alice(svc: &AuthService) -> User {
        svc.create_user(CreateUser {
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password_hash: super::hash_password("secret").unwrap(),
        })
        .unwrap()
    }
}
