use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::imaging::ImagingError;
use super::types::ErrorBody;

/// Failures of the analysis endpoints, rendered as `{"error": ...}`
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    /// Carries the status multer chose, e.g. 413 when the body limit is hit
    #[error("Malformed upload: {}", .0.body_text())]
    Upload(#[from] MultipartError),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Upload(e) => e.status(),
            AppError::Imaging(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Imaging(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}
