use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default class labels, in the order of the classifier's output layer
pub const DEFAULT_CLASS_LABELS: [&str; 5] = [
    "Pneumonia",
    "Normal",
    "COVID-19",
    "Tuberculosis",
    "Lung Cancer",
];

/// Side length images are resized to before inference
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Result of classifying one image.
///
/// Confidence values are percentages (0-100).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImagePrediction {
    /// Label with the highest score
    pub diagnosis: String,
    /// Score of the winning label
    pub confidence: f32,
    /// Score of every label
    pub all_probabilities: BTreeMap<String, f32>,
}

/// Errors raised while turning an upload into a prediction
#[derive(Debug, Error)]
pub enum ImagingError {
    /// The upload could not be decoded as an image
    #[error("Invalid image: {0}")]
    Decode(#[from] image::ImageError),
    /// The preprocessed pixels did not fit the expected tensor shape
    #[error("Invalid tensor shape: {0}")]
    Shape(#[from] ndarray::ShapeError),
    /// The classifier answered with the wrong number of scores
    #[error("Classifier returned {got} scores for {expected} labels")]
    ScoreCount { expected: usize, got: usize },
    /// The remote model server could not be reached or answered badly
    #[error("Model server error: {0}")]
    Backend(String),
    /// The preprocessing task was cancelled or panicked
    #[error("Preprocessing task failed: {0}")]
    Task(String),
}

impl ImagingError {
    /// Whether the error was caused by the uploaded data rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ImagingError::Decode(_))
    }
}
