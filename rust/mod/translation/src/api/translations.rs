use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use polyglot_core::{Authenticated, Page, PageParams, ServiceError};

use crate::api::AppState;
use crate::model::{ExportQuery, Translation, TranslationFilters, TranslationInput};
use crate::service::TranslationService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/translations", get(list_translations).post(create_translation))
        .route("/translations/export", get(export_translations))
        .route(
            "/translations/{id}",
            get(get_translation)
                .put(update_translation)
                .delete(delete_translation),
        )
}

async fn list_translations(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Query(filters): Query<TranslationFilters>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Translation>>, ServiceError> {
    Ok(Json(svc.list_translations(&filters, &params)?))
}

async fn create_translation(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Json(input): Json<TranslationInput>,
) -> Result<(StatusCode, Json<Translation>), ServiceError> {
    let translation = svc.create_translation(input)?;
    Ok((StatusCode::CREATED, Json(translation)))
}

async fn get_translation(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<Translation>, ServiceError> {
    Ok(Json(svc.get_translation(id)?))
}

async fn update_translation(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
    Json(input): Json<TranslationInput>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let translation = svc.update_translation(id, input)?;
    Ok(Json(serde_json::json!({
        "message": "Translation updated successfully",
        "translation": translation,
    })))
}

async fn delete_translation(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_translation(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Public read path for frontends: a flat key → value map.
async fn export_translations(
    State(svc): State<Arc<TranslationService>>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<BTreeMap<String, String>>, ServiceError> {
    Ok(Json(svc.export(&query.into())?))
}
