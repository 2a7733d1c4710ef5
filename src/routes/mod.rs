use axum::{
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    db::Dataset,
    middleware::request_id::{make_span_with_request_id, request_id_middleware},
    services::ProfileAggregator,
};

pub mod cities;
pub mod rank;
pub mod recommendations;

/// Shared, read-only application state
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub aggregator: ProfileAggregator,
}

/// Creates the application router with all routes
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(cities::categories))
        .route("/residences", get(cities::residences))
        .route("/cities/:name/overview", get(cities::overview))
        .route("/cities/:name/profile", get(cities::profile))
        .route("/rank", post(rank::rank))
        .route("/recommendations", post(recommendations::recommend))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
