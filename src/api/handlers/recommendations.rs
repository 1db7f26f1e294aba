use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    api::AppState,
    models::Content,
    services::recommendations::{self, RecommendationQuery},
};

/// Genre-based suggestions for `uid`, or the latest content without one
pub async fn recommend(
    State(state): State<AppState>,
    Query(query): Query<RecommendationQuery>,
) -> Json<Vec<Content>> {
    Json(recommendations::recommend(state.optional_store(), &query).await)
}
