mod analyzer;
mod catalog;
mod keyword;
mod types;
mod zero_shot;

pub use analyzer::SymptomAnalyzer;
pub use catalog::{CatalogError, Condition, ConditionCatalog, DEFAULT_CATALOG};
pub use keyword::keyword_match;
pub use types::{
    SymptomAnalysis, GENERIC_RECOMMENDATION, INCONCLUSIVE_DIAGNOSIS, KEYWORD_MODEL,
    SAMPLE_SYMPTOMS,
};
pub use zero_shot::{HttpZeroShotClassifier, ZeroShotClassifier, ZeroShotError, ZeroShotPrediction};
