use serde::{Deserialize, Serialize};

/// Generic API response wrapper used by the record endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: String,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Request body of the symptom analysis endpoint
#[derive(Debug, Deserialize, Serialize)]
pub struct SymptomsRequest {
    pub symptoms: String,
}

/// Error body of the analysis endpoints
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorBody {
    pub error: String,
}
