use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::generator::GenerationError;
use crate::models::ErrorResponse;

/// Everything that can go wrong while serving a recommendation.
#[derive(Debug, Error)]
pub enum RecommendationError {
    #[error("Input text is required")]
    MissingText,

    #[error(transparent)]
    Upstream(#[from] GenerationError),
}

impl RecommendationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RecommendationError::MissingText => StatusCode::BAD_REQUEST,
            RecommendationError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RecommendationError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            RecommendationError::MissingText => warn!("Rejected request without input text"),
            RecommendationError::Upstream(e) => error!(error = %e, "Model call failed"),
        }

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
