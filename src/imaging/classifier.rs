use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ndarray::{Array4, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::ImagingError;

/// A model that scores a preprocessed image against a fixed set of classes.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    /// Returns one score per class, in the classifier's label order.
    async fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ImagingError>;

    /// Short description of the backend, used in logs
    fn name(&self) -> &str;
}

/// Stand-in classifier that draws a random probability distribution.
///
/// Used when no trained model is deployed so the API and its clients can be
/// exercised end to end.
pub struct MockClassifier {
    num_classes: usize,
    rng: Mutex<StdRng>,
}

impl MockClassifier {
    pub fn new(num_classes: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            num_classes,
            rng: Mutex::new(rng),
        }
    }

    fn random_distribution(&self) -> Result<Vec<f32>, ImagingError> {
        let mut rng = self.rng.lock()
            .map_err(|e| ImagingError::Backend(format!("Mock classifier lock poisoned: {}", e)))?;
        let raw: Vec<f32> = (0..self.num_classes).map(|_| rng.random::<f32>()).collect();
        Ok(normalize(raw))
    }
}

/// Scales scores so they sum to one. An all-zero input becomes uniform.
fn normalize(scores: Vec<f32>) -> Vec<f32> {
    let total: f32 = scores.iter().sum();
    if total <= f32::EPSILON {
        let uniform = 1.0 / scores.len().max(1) as f32;
        return vec![uniform; scores.len()];
    }
    scores.into_iter().map(|s| s / total).collect()
}

#[async_trait]
impl ImageClassifier for MockClassifier {
    async fn predict(&self, _input: &Array4<f32>) -> Result<Vec<f32>, ImagingError> {
        self.random_distribution()
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<Vec<Vec<Vec<f32>>>>,
}

#[derive(Deserialize)]
struct PredictResponse {
    predictions: Vec<Vec<f32>>,
}

/// Client for a model server exposing the TensorFlow Serving REST predict API.
pub struct RemoteClassifier {
    endpoint: String,
    client: reqwest::Client,
}

impl RemoteClassifier {
    pub fn new(endpoint: String, timeout_secs: u64) -> Result<Self, ImagingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ImagingError::Backend(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { endpoint, client })
    }

    /// Converts the `(batch, height, width, channel)` tensor into nested rows.
    fn to_instances(input: &Array4<f32>) -> Vec<Vec<Vec<Vec<f32>>>> {
        input
            .axis_iter(Axis(0))
            .map(|image| {
                image
                    .axis_iter(Axis(0))
                    .map(|row| {
                        row.axis_iter(Axis(0))
                            .map(|pixel| pixel.to_vec())
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }
}

#[async_trait]
impl ImageClassifier for RemoteClassifier {
    async fn predict(&self, input: &Array4<f32>) -> Result<Vec<f32>, ImagingError> {
        let request = PredictRequest {
            instances: Self::to_instances(input),
        };

        debug!("Sending predict request to {}", self.endpoint);
        let response = self.client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| ImagingError::Backend(e.to_string()))?
            .error_for_status()
            .map_err(|e| ImagingError::Backend(e.to_string()))?;

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| ImagingError::Backend(format!("Malformed predict response: {}", e)))?;

        body.predictions
            .into_iter()
            .next()
            .ok_or_else(|| ImagingError::Backend("Predict response contained no predictions".to_string()))
    }

    fn name(&self) -> &str {
        "remote"
    }
}
