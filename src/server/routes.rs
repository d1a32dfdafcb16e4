use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, Multipart},
    extract::multipart::MultipartRejection,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{json, Value};
use tracing::{info, error, warn};

use crate::imaging::ImagePrediction;
use crate::records::{DiagnosisRecord, NewDiagnosisRecord, StoreError};
use crate::symptoms::SymptomAnalysis;
use super::error::AppError;
use super::state::AppState;
use super::types::{ApiResponse, SymptomsRequest};

/// Name of the multipart field carrying the uploaded image
const IMAGE_FIELD: &str = "image";

pub async fn index() -> Json<Value> {
    Json(json!({ "message": "Welcome to the Medical Image Analysis API" }))
}

pub async fn health_check() -> Json<Value> {
    info!("Health check endpoint called");
    Json(json!({ "status": "ok" }))
}

/// Classifies the image uploaded in the `image` multipart field.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImagePrediction>, AppError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("Predict called without a multipart body: {}", e);
        AppError::BadRequest("No image file provided".to_string())
    })?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            let bytes = field.bytes().await?;
            image = Some(bytes);
            break;
        }
    }

    let bytes = image
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::BadRequest("No image file provided".to_string()))?;
    info!("Predict endpoint called with {} byte image", bytes.len());

    let prediction = state.images.analyze(bytes.to_vec()).await?;
    Ok(Json(prediction))
}

/// Analyzes a free-text symptom description.
pub async fn analyze_symptoms(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SymptomsRequest>, JsonRejection>,
) -> Result<Json<SymptomAnalysis>, AppError> {
    let symptoms = match payload {
        Ok(Json(request)) if !request.symptoms.trim().is_empty() => request.symptoms,
        Ok(_) => return Err(AppError::BadRequest("No symptoms provided".to_string())),
        Err(e) => {
            warn!("Rejected symptoms payload: {}", e);
            return Err(AppError::BadRequest("No symptoms provided".to_string()));
        }
    };
    info!("Symptoms endpoint called with {} characters", symptoms.len());

    let analysis = state.symptoms.analyze(&symptoms).await;
    info!(
        "Symptoms analyzed as {} ({:.1}%) using {}",
        analysis.diagnosis, analysis.confidence, analysis.model_used
    );
    Ok(Json(analysis))
}

/// Stores a diagnosis record
pub async fn create_record(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewDiagnosisRecord>, JsonRejection>,
) -> impl IntoResponse {
    let new_record = match payload {
        Ok(Json(record)) => record,
        Err(e) => {
            warn!("Rejected record payload: {}", e);
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<DiagnosisRecord>::error(format!("Invalid record: {}", e.body_text()))),
            );
        }
    };

    match state.records.create(new_record) {
        Ok(record) => (StatusCode::CREATED, Json(ApiResponse::success(record))),
        Err(StoreError::Validation(message)) => {
            warn!("Record validation failed: {}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(format!("Invalid record: {}", message))),
            )
        }
        Err(e) => {
            error!("Failed to store record: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e.to_string())))
        }
    }
}

/// Lists stored records, newest first
pub async fn list_records(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.records.list() {
        Ok(records) => {
            info!("Listing {} diagnosis records", records.len());
            (StatusCode::OK, Json(ApiResponse::success(records)))
        }
        Err(e) => {
            error!("Failed to list records: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<DiagnosisRecord>>::error(e.to_string())),
            )
        }
    }
}

pub async fn get_record(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    match state.records.get(&id) {
        Ok(Some(record)) => (StatusCode::OK, Json(ApiResponse::success(record))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error(format!("Record {} not found", id))),
        ),
        Err(e) => {
            error!("Failed to read record {}: {}", id, e);
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ApiResponse::error(e.to_string())))
        }
    }
}
