use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::Recommendation,
    routes::AppState,
    services::recommendations::{self, RecommendationRequest},
};

/// Handler for recommendations endpoint
pub async fn recommend(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> AppResult<Json<Recommendation>> {
    let Json(request) = payload?;
    tracing::info!(request_id = %request_id, "Processing recommendation request");

    let recommendation =
        recommendations::recommend(&state.dataset, &state.aggregator, request).await?;

    tracing::info!(
        request_id = %request_id,
        city = %recommendation.city,
        "Recommendation completed"
    );

    Ok(Json(recommendation))
}
