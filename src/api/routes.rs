use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{admin, content, recommendations, system, users};
use super::AppState;
use crate::middleware::request_id::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(system::root))
        .route("/test", get(system::test_database))
        .nest("/api", api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
}

/// Routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Content catalog
        .route(
            "/content",
            get(content::list_content).post(content::create_content),
        )
        .route(
            "/content/:id",
            get(content::get_content).delete(content::delete_content),
        )
        // User profiles
        .route("/users/:uid", get(users::get_user))
        .route("/users/:uid/favorites", post(users::toggle_favorite))
        .route("/users/:uid/history", post(users::update_history))
        // Recommendations
        .route("/recommendations", get(recommendations::recommend))
        // Admin
        .route("/admin/metrics", get(admin::metrics))
}
