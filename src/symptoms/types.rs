use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// Recommendation used whenever nothing more specific is known
pub const GENERIC_RECOMMENDATION: &str = "Please consult with a doctor for a professional diagnosis.";

/// Diagnosis reported when no condition keyword matches
pub const INCONCLUSIVE_DIAGNOSIS: &str = "Inconclusive based on provided symptoms";

/// `model_used` value for results produced by keyword overlap
pub const KEYWORD_MODEL: &str = "keyword matching";

/// Descriptions used to smoke-test a freshly written catalog
pub const SAMPLE_SYMPTOMS: [&str; 5] = [
    "I have a headache and sensitivity to light",
    "I'm experiencing cough, fever, and sore throat",
    "I have abdominal pain and nausea",
    "I have a rash and itchy skin",
    "I feel tired and have a mild fever",
];

/// Outcome of analyzing a free-text symptom description.
///
/// `confidence` and the differential scores are percentages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymptomAnalysis {
    pub diagnosis: String,
    pub confidence: f32,
    pub recommendation: String,
    pub model_used: String,
    /// Runner-up conditions from the zero-shot model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub differential_diagnosis: Option<BTreeMap<String, f32>>,
    /// Why the zero-shot model could not be used for this request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_error: Option<String>,
}
