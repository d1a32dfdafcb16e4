use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::imaging::ImagePrediction;
use crate::symptoms::SymptomAnalysis;

/// Which analysis produced a record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Symptoms,
    Image,
}

/// Review state of a record. New records always start out pending.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Pending,
}

/// Condensed model output stored with a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSummary {
    pub diagnosis: String,
    /// Percent, 0-100
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
}

impl From<&SymptomAnalysis> for ResultSummary {
    fn from(analysis: &SymptomAnalysis) -> Self {
        Self {
            diagnosis: analysis.diagnosis.clone(),
            confidence: analysis.confidence,
            recommendation: Some(analysis.recommendation.clone()),
            model_used: Some(analysis.model_used.clone()),
        }
    }
}

impl From<&ImagePrediction> for ResultSummary {
    fn from(prediction: &ImagePrediction) -> Self {
        Self {
            diagnosis: prediction.diagnosis.clone(),
            confidence: prediction.confidence,
            recommendation: None,
            model_used: None,
        }
    }
}

/// Client-supplied fields of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewDiagnosisRecord {
    pub kind: RecordKind,
    #[serde(default)]
    pub patient_name: Option<String>,
    /// Symptom text or a description of the image
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub result: ResultSummary,
}

/// A stored diagnosis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub kind: RecordKind,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub result: ResultSummary,
}
