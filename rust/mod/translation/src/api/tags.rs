use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use polyglot_core::{Authenticated, Page, PageParams, ServiceError};

use crate::api::AppState;
use crate::model::{Tag, TagInput, TagSearch};
use crate::service::TranslationService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", get(get_tag).put(update_tag).delete(delete_tag))
}

async fn list_tags(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Query(search): Query<TagSearch>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<Tag>>, ServiceError> {
    Ok(Json(svc.list_tags(search.search.as_deref(), &params)?))
}

async fn create_tag(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Json(input): Json<TagInput>,
) -> Result<(StatusCode, Json<Tag>), ServiceError> {
    let tag = svc.create_tag(input)?;
    Ok((StatusCode::CREATED, Json(tag)))
}

async fn get_tag(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<Json<Tag>, ServiceError> {
    Ok(Json(svc.get_tag(id)?))
}

async fn update_tag(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, ServiceError> {
    Ok(Json(svc.update_tag(id, input)?))
}

async fn delete_tag(
    State(svc): State<Arc<TranslationService>>,
    _auth: Authenticated,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_tag(id)?;
    Ok(StatusCode::NO_CONTENT)
}
