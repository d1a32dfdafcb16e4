//! Client for hosted zero-shot text classification.
//!
//! Speaks the Hugging Face Inference API format: the request carries the text
//! and candidate labels, the response lists the labels with their scores.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Labels ranked by descending score. Scores are fractions of one.
#[derive(Debug, Clone, PartialEq)]
pub struct ZeroShotPrediction {
    pub labels: Vec<String>,
    pub scores: Vec<f32>,
}

impl ZeroShotPrediction {
    /// Builds a prediction, sorting the labels by descending score.
    pub fn ranked(labels: Vec<String>, scores: Vec<f32>) -> Result<Self, ZeroShotError> {
        if labels.is_empty() || labels.len() != scores.len() {
            return Err(ZeroShotError::Malformed(format!(
                "{} labels and {} scores",
                labels.len(),
                scores.len()
            )));
        }
        let mut pairs: Vec<(String, f32)> = labels.into_iter().zip(scores).collect();
        pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        let (labels, scores) = pairs.into_iter().unzip();
        Ok(Self { labels, scores })
    }

    /// Best label and its score
    pub fn top(&self) -> Option<(&str, f32)> {
        self.labels.first().map(|l| l.as_str()).zip(self.scores.first().copied())
    }
}

#[derive(Debug, Error)]
pub enum ZeroShotError {
    #[error("Request to zero-shot model failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Zero-shot model returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed zero-shot response: {0}")]
    Malformed(String),
}

/// A text classifier that ranks arbitrary candidate labels.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    /// Ranks `candidate_labels` for `text`. Each label is inserted into
    /// `hypothesis_template` in place of `{}`.
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        hypothesis_template: &str,
    ) -> Result<ZeroShotPrediction, ZeroShotError>;

    /// Model identifier, reported back to clients
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParameters<'a>,
}

#[derive(Serialize)]
struct ClassifyParameters<'a> {
    candidate_labels: &'a [String],
    hypothesis_template: &'a str,
    multi_label: bool,
}

#[derive(Deserialize)]
struct ClassifyOutput {
    labels: Vec<String>,
    scores: Vec<f32>,
}

/// The API answers single inputs with an object, some deployments wrap it in a list
#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifyResponse {
    Single(ClassifyOutput),
    Batch(Vec<ClassifyOutput>),
}

/// Zero-shot classifier backed by an HTTP inference endpoint.
pub struct HttpZeroShotClassifier {
    base_url: String,
    model: String,
    api_token: Option<String>,
    client: reqwest::Client,
}

impl HttpZeroShotClassifier {
    pub fn new(
        base_url: String,
        model: String,
        api_token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, ZeroShotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            api_token: api_token.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpZeroShotClassifier {
    async fn classify(
        &self,
        text: &str,
        candidate_labels: &[String],
        hypothesis_template: &str,
    ) -> Result<ZeroShotPrediction, ZeroShotError> {
        let request = ClassifyRequest {
            inputs: text,
            parameters: ClassifyParameters {
                candidate_labels,
                hypothesis_template,
                multi_label: false,
            },
        };

        let url = self.endpoint();
        debug!("Zero-shot request to {} with {} labels", url, candidate_labels.len());

        let mut builder = self.client.post(&url).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ZeroShotError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let output = match response.json::<ClassifyResponse>().await {
            Ok(ClassifyResponse::Single(output)) => output,
            Ok(ClassifyResponse::Batch(outputs)) => outputs
                .into_iter()
                .next()
                .ok_or_else(|| ZeroShotError::Malformed("empty result list".to_string()))?,
            Err(e) => return Err(ZeroShotError::Malformed(e.to_string())),
        };

        ZeroShotPrediction::ranked(output.labels, output.scores)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
