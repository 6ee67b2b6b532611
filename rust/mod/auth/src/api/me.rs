use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use polyglot_core::{Authenticated, ServiceError};

use crate::api::AppState;
use crate::model::User;
use crate::service::AuthService;

pub fn routes() -> Router<AppState> {
    Router::new().route("/user", get(me))
}

/// GET /user: the authenticated user.
async fn me(
    State(svc): State<Arc<AuthService>>,
    Authenticated(principal): Authenticated,
) -> Result<Json<User>, ServiceError> {
    Ok(Json(svc.get_user(&principal.user_id)?))
}
