use std::sync::Arc;

use tracing::{info, warn};

use super::catalog::ConditionCatalog;
use super::keyword::keyword_match;
use super::types::{SymptomAnalysis, GENERIC_RECOMMENDATION};
use super::zero_shot::ZeroShotClassifier;

/// Number of runner-up conditions reported alongside a zero-shot diagnosis
const DIFFERENTIAL_SIZE: usize = 3;

/// Combines keyword matching with an optional zero-shot model.
///
/// Keyword matching always runs and is the answer unless the zero-shot model
/// is configured, succeeds, and is confident enough to take over.
pub struct SymptomAnalyzer {
    catalog: ConditionCatalog,
    classifier: Option<Arc<dyn ZeroShotClassifier>>,
    /// Percent the top zero-shot score must exceed
    threshold: f32,
    hypothesis_template: String,
}

impl SymptomAnalyzer {
    pub fn new(
        catalog: ConditionCatalog,
        classifier: Option<Arc<dyn ZeroShotClassifier>>,
        threshold: f32,
        hypothesis_template: String,
    ) -> Self {
        Self {
            catalog,
            classifier,
            threshold,
            hypothesis_template,
        }
    }

    pub fn catalog(&self) -> &ConditionCatalog {
        &self.catalog
    }

    /// Whether a zero-shot model is wired in
    pub fn has_model(&self) -> bool {
        self.classifier.is_some()
    }

    pub async fn analyze(&self, symptoms: &str) -> SymptomAnalysis {
        let mut result = keyword_match(symptoms, &self.catalog);

        let Some(classifier) = &self.classifier else {
            return result;
        };

        let labels = self.catalog.labels();
        match classifier.classify(symptoms, &labels, &self.hypothesis_template).await {
            Ok(prediction) => {
                let Some((top_label, top_score)) = prediction.top() else {
                    return result;
                };
                // Compared in f64 so that a score of 0.4 clears a threshold of 40
                let confidence = f64::from(top_score) * 100.0;
                if confidence > f64::from(self.threshold) {
                    result.diagnosis = top_label.to_string();
                    result.confidence = confidence as f32;
                    result.recommendation = self
                        .catalog
                        .get(top_label)
                        .map(|c| c.recommendation.clone())
                        .unwrap_or_else(|| GENERIC_RECOMMENDATION.to_string());
                    result.model_used = format!("{} zero-shot classification", classifier.model_name());
                    result.differential_diagnosis = Some(
                        prediction
                            .labels
                            .iter()
                            .zip(&prediction.scores)
                            .skip(1)
                            .take(DIFFERENTIAL_SIZE)
                            .map(|(label, score)| (label.clone(), score * 100.0))
                            .collect(),
                    );
                } else {
                    info!(
                        "Zero-shot confidence {:.1}% for {} below threshold, keeping keyword result",
                        confidence, top_label
                    );
                }
            }
            Err(e) => {
                warn!("Zero-shot classification failed: {}", e);
                result.model_error = Some(e.to_string());
            }
        }

        result
    }
}
