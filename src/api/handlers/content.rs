use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;

use crate::{
    api::AppState,
    error::AppResult,
    middleware::request_id::RequestId,
    models::{Content, ContentIn},
    services::catalog::{self, ContentQuery},
};

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

/// Lists published content, newest first
pub async fn list_content(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Json<Vec<Content>> {
    Json(catalog::list_content(state.optional_store(), &query).await)
}

/// Adds a catalog entry
pub async fn create_content(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(payload): Json<ContentIn>,
) -> AppResult<Json<CreatedResponse>> {
    tracing::info!(request_id = %request_id, title = %payload.title, "Creating content");

    let id = catalog::create_content(state.store()?, payload).await?;
    Ok(Json(CreatedResponse { id: id.to_string() }))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Content>> {
    let content = catalog::get_content(state.store()?, &id).await?;
    Ok(Json(content))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> AppResult<Json<DeletedResponse>> {
    tracing::info!(request_id = %request_id, id = %id, "Deleting content");

    catalog::delete_content(state.store()?, &id).await?;
    Ok(Json(DeletedResponse { deleted: true }))
}
