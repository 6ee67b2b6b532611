use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};

use polyglot_core::{Authenticated, ServiceError};

use crate::api::AppState;
use crate::model::{LoginRequest, LoginResponse};
use crate::service::AuthService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// POST /login: email + password → bearer token.
async fn login(
    State(svc): State<Arc<AuthService>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServiceError> {
    Ok(Json(svc.login(&body)?))
}

/// POST /logout: revoke the session behind the presented token.
async fn logout(
    State(svc): State<Arc<AuthService>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.revoke_session(&principal.session_id)?;
    Ok(Json(serde_json::json!({"message": "Logged out successfully"})))
}
