use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    api::AppState,
    error::AppResult,
    middleware::request_id::RequestId,
    models::{FavoriteAction, HistoryUpdate, UserProfile, WatchEntry},
    services::profiles,
};

#[derive(Debug, Deserialize)]
pub struct FavoriteQuery {
    pub content_id: String,
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub status: &'static str,
    pub action: FavoriteAction,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Returns the profile for `uid`.
///
/// Creates an empty profile when the uid has never been seen, so this GET
/// can write. Clients rely on this to provision profiles.
pub async fn get_user(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> AppResult<Json<UserProfile>> {
    let profile = profiles::get_or_create_profile(state.store()?, &uid).await?;
    Ok(Json(profile))
}

pub async fn toggle_favorite(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(uid): Path<String>,
    Query(query): Query<FavoriteQuery>,
) -> AppResult<Json<FavoriteResponse>> {
    tracing::debug!(request_id = %request_id, uid = %uid, "Toggling favorite");

    let action = profiles::toggle_favorite(state.store()?, &uid, &query.content_id).await?;
    Ok(Json(FavoriteResponse { status: "ok", action }))
}

pub async fn update_history(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path(uid): Path<String>,
    Json(update): Json<HistoryUpdate>,
) -> AppResult<Json<StatusResponse>> {
    tracing::debug!(request_id = %request_id, uid = %uid, "Recording watch progress");

    let entry = WatchEntry::from(update);
    // Reject bad progress before touching the store
    entry.validate()?;
    profiles::update_history(state.store()?, &uid, entry).await?;
    Ok(Json(StatusResponse { status: "ok" }))
}
