mod analyzer;
mod classifier;
mod preprocess;
mod types;

pub use analyzer::ImageAnalyzer;
pub use classifier::{ImageClassifier, MockClassifier, RemoteClassifier};
pub use preprocess::preprocess;
pub use types::{ImagePrediction, ImagingError, DEFAULT_CLASS_LABELS, DEFAULT_INPUT_SIZE};
