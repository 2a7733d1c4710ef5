use serde::Deserialize;

use crate::{
    db::Dataset,
    error::{AppError, AppResult},
    models::{PreferenceVector, Recommendation, Residence},
    services::{aggregation::ProfileAggregator, ranking::Ranker},
};

pub const DEFAULT_LANGUAGE: &str = "en";

pub fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

/// A user's recommendation request as submitted by the presentation layer
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationRequest {
    pub categories: Vec<String>,
    pub ratings: Vec<i64>,
    /// Residence selection, e.g. `"Lisbon, Portugal"` or `"Others"`
    pub residence: String,
    #[serde(default = "default_language")]
    pub language: String,
}

/// Recommends a city and assembles everything known about it
///
/// Ranks exactly once, then aggregates the winning city's profile exactly once.
pub async fn recommend(
    dataset: &Dataset,
    aggregator: &ProfileAggregator,
    request: RecommendationRequest,
) -> AppResult<Recommendation> {
    tracing::info!(
        categories = ?request.categories,
        residence = %request.residence,
        language = %request.language,
        "Processing recommendation request"
    );

    let preferences = PreferenceVector::new(request.categories, request.ratings)?;
    let residence = Residence::from_selection(&request.residence);

    let winner = Ranker::new(dataset).rank(&preferences, &residence)?;

    let overview = dataset
        .overview(&winner.name)
        .ok_or_else(|| AppError::Internal(format!("No overview for {}", winner.name)))?;

    let profile = aggregator.aggregate(&winner.name, &request.language).await?;

    tracing::info!(city = %winner.name, "Recommendation completed");

    Ok(Recommendation {
        city: winner.name.clone(),
        overview,
        profile,
    })
}
