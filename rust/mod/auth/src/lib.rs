//! Auth module: API users, login sessions and bearer tokens.
//!
//! # Resources
//!
//! - **User**: email + argon2id password hash
//! - **Session**: one per issued JWT; revoking it logs the token out
//!
//! [`AuthService`](service::AuthService) implements
//! [`polyglot_core::Authenticator`], so other modules check bearer tokens
//! through the core seam without depending on this crate.
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, service::AuthConfig};
//!
//! let module = AuthModule::new(sql, AuthConfig::default())?;
//! let authenticator = module.authenticator();
//! let router = module.routes(); // /login, /logout, /user
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use polyglot_core::{Authenticator, Module, ServiceError};
use polyglot_sql::SQLStore;

use crate::service::{AuthConfig, AuthService};

/// Auth module implementing the Module trait.
pub struct AuthModule {
    service: Arc<AuthService>,
}

impl AuthModule {
    /// Create a new AuthModule.
    pub fn new(sql: Arc<dyn SQLStore>, config: AuthConfig) -> Result<Self, ServiceError> {
        let service = AuthService::new(sql, config)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying AuthService.
    pub fn service(&self) -> &Arc<AuthService> {
        &self.service
    }

    /// The service as a bearer-token authenticator for other modules.
    pub fn authenticator(&self) -> Arc<dyn Authenticator> {
        self.service.clone()
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
