use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::request_id::RequestId,
    models::{PreferenceVector, Residence},
    routes::AppState,
    services::Ranker,
};

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    pub categories: Vec<String>,
    pub ratings: Vec<i64>,
    pub residence: String,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub city: String,
    pub country: String,
}

/// Handler for the ranking endpoint
pub async fn rank(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    payload: Result<Json<RankRequest>, JsonRejection>,
) -> AppResult<Json<RankResponse>> {
    let Json(request) = payload?;
    tracing::info!(
        request_id = %request_id,
        category_count = request.categories.len(),
        "Processing rank request"
    );

    let preferences = PreferenceVector::new(request.categories, request.ratings)?;
    let residence = Residence::from_selection(&request.residence);
    let city = Ranker::new(&state.dataset).rank(&preferences, &residence)?;

    Ok(Json(RankResponse {
        city: city.name.clone(),
        country: city.country.clone(),
    }))
}
