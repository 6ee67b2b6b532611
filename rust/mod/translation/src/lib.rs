//! Translation module: locales, tags and localized strings.
//!
//! # Resources
//!
//! - **Locale**: language code + display name, code unique
//! - **Tag**: free-text label, name unique, created on demand
//! - **Translation**: (locale, key) → value, tagged many-to-many
//!
//! Listing filters by key prefix, locale code and tag name; the public
//! export flattens a locale (and optionally a set of tags) into a single
//! key → value map for frontends.
//!
//! # Usage
//!
//! ```ignore
//! use translation::TranslationModule;
//!
//! let module = TranslationModule::new(sql, authenticator)?;
//! let router = module.routes();
//! ```

pub mod api;
pub mod model;
pub mod service;

use std::sync::Arc;

use axum::Router;

use polyglot_core::{Authenticator, Module, ServiceError};
use polyglot_sql::SQLStore;

use crate::service::TranslationService;

/// Translation module implementing the Module trait.
pub struct TranslationModule {
    service: Arc<TranslationService>,
    auth: Arc<dyn Authenticator>,
}

impl TranslationModule {
    /// Create a new TranslationModule, initializing its schema.
    pub fn new(sql: Arc<dyn SQLStore>, auth: Arc<dyn Authenticator>) -> Result<Self, ServiceError> {
        let service = TranslationService::new(sql)?;
        Ok(Self { service, auth })
    }

    /// Get a reference to the underlying TranslationService.
    pub fn service(&self) -> &Arc<TranslationService> {
        &self.service
    }
}

impl Module for TranslationModule {
    fn name(&self) -> &str {
        "translation"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone(), self.auth.clone())
    }
}
