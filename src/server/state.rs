use std::error::Error;
use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{ImageBackendKind, Settings};
use crate::imaging::{ImageAnalyzer, ImageClassifier, MockClassifier, RemoteClassifier};
use crate::records::RecordStore;
use crate::symptoms::{ConditionCatalog, HttpZeroShotClassifier, SymptomAnalyzer, ZeroShotClassifier};

/// Everything the request handlers share
pub struct AppState {
    pub images: ImageAnalyzer,
    pub symptoms: SymptomAnalyzer,
    pub records: RecordStore,
}

impl AppState {
    pub fn new(images: ImageAnalyzer, symptoms: SymptomAnalyzer) -> Self {
        Self {
            images,
            symptoms,
            records: RecordStore::new(),
        }
    }

    /// Wires up both models as described by the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let image_config = &settings.models.image;
        let classifier: Arc<dyn ImageClassifier> = match image_config.backend {
            ImageBackendKind::Mock => {
                warn!("No image model deployed, serving mock predictions");
                Arc::new(MockClassifier::new(image_config.labels.len(), image_config.seed))
            }
            ImageBackendKind::Remote => {
                info!("Using remote image model at {}", image_config.endpoint);
                Arc::new(RemoteClassifier::new(image_config.endpoint.clone(), image_config.timeout_secs)?)
            }
        };
        let images = ImageAnalyzer::new(classifier, image_config.labels.clone(), image_config.input_size);

        let symptom_config = &settings.models.symptoms;
        let catalog = match &symptom_config.catalog_path {
            Some(path) if path.exists() => {
                info!("Loading condition catalog from {}", path.display());
                ConditionCatalog::load(path)?
            }
            Some(path) => {
                warn!("Condition catalog {} not found, using built-in catalog", path.display());
                ConditionCatalog::default()
            }
            None => ConditionCatalog::default(),
        };

        let zero_shot = &symptom_config.zero_shot;
        let text_classifier: Option<Arc<dyn ZeroShotClassifier>> = if zero_shot.enabled {
            info!("Zero-shot classification enabled with model {}", zero_shot.model);
            Some(Arc::new(HttpZeroShotClassifier::new(
                zero_shot.base_url.clone(),
                zero_shot.model.clone(),
                zero_shot.api_token.clone(),
                zero_shot.timeout_secs,
            )?))
        } else {
            info!("Zero-shot classification disabled, using keyword matching only");
            None
        };

        let symptoms = SymptomAnalyzer::new(
            catalog,
            text_classifier,
            symptom_config.threshold,
            symptom_config.hypothesis_template.clone(),
        );

        Ok(Self::new(images, symptoms))
    }
}
