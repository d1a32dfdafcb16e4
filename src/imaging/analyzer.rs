use std::sync::Arc;

use tracing::info;

use super::classifier::ImageClassifier;
use super::preprocess::preprocess;
use super::types::{ImagePrediction, ImagingError};

/// Runs uploads through preprocessing and the configured classifier.
pub struct ImageAnalyzer {
    classifier: Arc<dyn ImageClassifier>,
    labels: Vec<String>,
    input_size: u32,
}

impl ImageAnalyzer {
    pub fn new(classifier: Arc<dyn ImageClassifier>, labels: Vec<String>, input_size: u32) -> Self {
        Self {
            classifier,
            labels,
            input_size,
        }
    }

    /// Classifies the raw bytes of an uploaded image.
    pub async fn analyze(&self, bytes: Vec<u8>) -> Result<ImagePrediction, ImagingError> {
        let size = self.input_size;
        // Decoding and resizing are CPU bound
        let input = tokio::task::spawn_blocking(move || preprocess(&bytes, size))
            .await
            .map_err(|e| ImagingError::Task(e.to_string()))??;

        let scores = self.classifier.predict(&input).await?;
        let prediction = build_prediction(&self.labels, &scores)?;
        info!(
            backend = self.classifier.name(),
            "Image classified as {} ({:.1}%)", prediction.diagnosis, prediction.confidence
        );
        Ok(prediction)
    }
}

/// Pairs raw scores with their labels and picks the best one.
///
/// Scores are fractions; the prediction reports percentages. Ties go to the
/// label that comes first.
fn build_prediction(labels: &[String], scores: &[f32]) -> Result<ImagePrediction, ImagingError> {
    if scores.len() != labels.len() || labels.is_empty() {
        return Err(ImagingError::ScoreCount {
            expected: labels.len(),
            got: scores.len(),
        });
    }

    let mut best = 0;
    for (i, score) in scores.iter().enumerate() {
        if *score > scores[best] {
            best = i;
        }
    }

    Ok(ImagePrediction {
        diagnosis: labels[best].clone(),
        confidence: scores[best] * 100.0,
        all_probabilities: labels
            .iter()
            .cloned()
            .zip(scores.iter().map(|s| s * 100.0))
            .collect(),
    })
}
