use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{CityOverview, CityProfile},
    routes::AppState,
    services::recommendations::default_language,
};

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    #[serde(default = "default_language")]
    lang: String,
}

/// Category labels users can rate
pub async fn categories(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dataset.categories().to_vec())
}

/// Residence choices, sentinels last
pub async fn residences(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.dataset.residence_options())
}

/// Dataset overview of a single city
pub async fn overview(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> AppResult<Json<CityOverview>> {
    state
        .dataset
        .overview(&name)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("City not in dataset: {}", name)))
}

/// Aggregated profile of a single city
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    Path(name): Path<String>,
    Query(params): Query<ProfileQuery>,
) -> AppResult<Json<CityProfile>> {
    tracing::info!(
        request_id = %request_id,
        city = %name,
        language = %params.lang,
        "Processing profile request"
    );

    let profile = state.aggregator.aggregate(&name, &params.lang).await?;
    Ok(Json(profile))
}
