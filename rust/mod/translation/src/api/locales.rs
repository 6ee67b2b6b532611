use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use polyglot_core::{Authenticated, ServiceError};

use crate::api::AppState;
use crate::model::{Locale, LocaleInput};
use crate::service::TranslationService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/locales", get(list_locales).post(create_locale))
        .route(
            "/locales/{id}",
            get(get_locale).put(update_locale).delete(delete_locale),
        )
}

async fn list_locales(
    State(svc): State<Arc<TranslationService>>,
) -> Result<Json<Vec<Locale>>, ServiceError> {
    Ok(Json(svc.list_locales()?))
}

async fn create_locale(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Json(input): Json<LocaleInput>,
) -> Result<(StatusCode, Json<Locale>), ServiceError> {
    let locale = svc.create_locale(input)?;
    Ok((StatusCode::CREATED, Json(locale)))
}

async fn get_locale(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<Locale>, ServiceError> {
    Ok(Json(svc.get_locale(id)?))
}

async fn update_locale(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
    Json(input): Json<LocaleInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let locale = svc.update_locale(id, input)?;
    Ok(Json(serde_json::json!({
        "message": "Locale updated successfully",
        "locale": locale,
    })))
}

async fn delete_locale(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_locale(id)?;
    Ok(StatusCode::NO_CONTENT)
}
