use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::ranking::RankingError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Dataset load error: {0}")]
    DatasetLoad(String),

    #[error("Curated travel-link table error: {0}")]
    CuratedTable(String),

    #[error("City not in curated travel-link table: {0}")]
    CityNotInCuratedTable(String),

    #[error("Ranking error: {0}")]
    Ranking(#[from] RankingError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::CityNotInCuratedTable(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Ranking(RankingError::NoCandidates) => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::Ranking(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::DatasetLoad(_) | AppError::CuratedTable(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

pub type AppResult<T> = Result<T, AppError>;
