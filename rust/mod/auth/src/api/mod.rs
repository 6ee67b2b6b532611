mod login;
mod me;

use std::sync::Arc;

use axum::Router;
use axum::extract::FromRef;

use polyglot_core::Authenticator;

use crate::service::AuthService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub svc: Arc<AuthService>,
    pub auth: Arc<dyn Authenticator>,
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        state.svc.clone()
    }
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Build the auth API router (`/login`, `/logout`, `/user`).
pub fn build_router(svc: Arc<AuthService>) -> Router {
    let auth: Arc<dyn Authenticator> = svc.clone();
    Router::new()
        .merge(login::routes())
        .merge(me::routes())
        .with_state(AppState { svc, auth })
}
