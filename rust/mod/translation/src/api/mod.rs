mod locales;
mod tags;
mod translations;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;

use polyglot_core::Authenticator;

use crate::service::TranslationService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<TranslationService>,
    pub auth: Arc<dyn Authenticator>,
}

impl FromRef<AppState> for Arc<TranslationService> {
    fn from_ref(state: &AppState) -> Self {
        state.svc.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Build the locale, tag and translation router.
///
/// Paths are absolute. Handlers that need a bearer credential take the
/// `Authenticated` extractor; `GET /locales` and the export are public.
pub fn build_router(svc: Arc<TranslationService>, auth: Arc<dyn Authenticator>) -> Router {
    Router::new()
        .merge(locales::routes())
        .merge(tags::routes())
        .merge(translations::routes())
        .with_state(AppState { svc, auth })
}
