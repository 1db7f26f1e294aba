use axum::{extract::State, Json};

use crate::{api::AppState, models::AdminMetrics, services::metrics};

pub async fn metrics(State(state): State<AppState>) -> Json<AdminMetrics> {
    Json(metrics::admin_metrics(state.optional_store()).await)
}
