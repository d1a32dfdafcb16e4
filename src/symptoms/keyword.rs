use super::catalog::ConditionCatalog;
use super::types::{SymptomAnalysis, GENERIC_RECOMMENDATION, INCONCLUSIVE_DIAGNOSIS, KEYWORD_MODEL};

/// Confidence granted per matched keyword, in percent
const CONFIDENCE_PER_MATCH: u32 = 20;
/// Keyword matching never claims more than this
const MAX_KEYWORD_CONFIDENCE: u32 = 90;
/// Confidence reported for an inconclusive result
const INCONCLUSIVE_CONFIDENCE: f32 = 20.0;

/// Scores each catalog condition by how many of its keywords appear in the text.
///
/// The condition with the most hits wins; on a tie the one listed first in
/// the catalog is kept.
pub fn keyword_match(text: &str, catalog: &ConditionCatalog) -> SymptomAnalysis {
    let lowered = text.to_lowercase();

    let mut best: Option<(usize, u32)> = None;
    for (i, condition) in catalog.conditions.iter().enumerate() {
        let matches = condition
            .keywords
            .iter()
            .filter(|keyword| !keyword.is_empty() && lowered.contains(keyword.as_str()))
            .count() as u32;
        if matches > best.map_or(0, |(_, m)| m) {
            best = Some((i, matches));
        }
    }

    match best {
        Some((i, matches)) => {
            let condition = &catalog.conditions[i];
            SymptomAnalysis {
                diagnosis: condition.name.clone(),
                confidence: (matches * CONFIDENCE_PER_MATCH).min(MAX_KEYWORD_CONFIDENCE) as f32,
                recommendation: condition.recommendation.clone(),
                model_used: KEYWORD_MODEL.to_string(),
                differential_diagnosis: None,
                model_error: None,
            }
        }
        None => SymptomAnalysis {
            diagnosis: INCONCLUSIVE_DIAGNOSIS.to_string(),
            confidence: INCONCLUSIVE_CONFIDENCE,
            recommendation: GENERIC_RECOMMENDATION.to_string(),
            model_used: KEYWORD_MODEL.to_string(),
            differential_diagnosis: None,
            model_error: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symptoms::catalog::Condition;

    #[test]
    fn test_single_condition_match() {
        let result = keyword_match("I have a headache and sensitivity to light", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Migraine");
        assert_eq!(result.confidence, 40.0);
        assert_eq!(result.model_used, "keyword matching");
        assert!(result.recommendation.starts_with("Rest in a quiet, dark room"));
    }

    #[test]
    fn test_case_insensitive() {
        let result = keyword_match("COUGH, FEVER and a Sore Throat", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Respiratory infection");
        assert_eq!(result.confidence, 60.0);
    }

    #[test]
    fn test_tie_keeps_first_condition() {
        // "nausea" belongs to both Migraine and Gastrointestinal issue
        let result = keyword_match("mostly nausea", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Migraine");
        assert_eq!(result.confidence, 20.0);
    }

    #[test]
    fn test_more_matches_beat_earlier_condition() {
        let result = keyword_match("abdominal pain and nausea", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Gastrointestinal issue");
        assert_eq!(result.confidence, 40.0);
    }

    #[test]
    fn test_substring_matching() {
        // "mild fever" also contains "fever", so both conditions score
        let result = keyword_match("I feel tired and have a mild fever", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Respiratory infection");
        assert_eq!(result.confidence, 20.0);
    }

    #[test]
    fn test_keywords_must_match_verbatim() {
        // A line break inside a multi-word keyword is not a match
        let result = keyword_match("shortness\nof breath", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, INCONCLUSIVE_DIAGNOSIS);
        assert_eq!(result.confidence, 20.0);

        let result = keyword_match("shortness of breath", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, "Respiratory infection");
    }

    #[test]
    fn test_confidence_is_capped() {
        let catalog = ConditionCatalog {
            conditions: vec![Condition {
                name: "Everything".to_string(),
                keywords: ["a", "b", "c", "d", "e", "f"].iter().map(|k| k.to_string()).collect(),
                recommendation: "See a doctor.".to_string(),
            }],
        };
        let result = keyword_match("a b c d e f", &catalog);
        assert_eq!(result.confidence, 90.0);
    }

    #[test]
    fn test_inconclusive() {
        let result = keyword_match("my elbow feels strange", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, INCONCLUSIVE_DIAGNOSIS);
        assert_eq!(result.confidence, 20.0);
        assert_eq!(result.recommendation, GENERIC_RECOMMENDATION);
        assert!(result.differential_diagnosis.is_none());
    }

    #[test]
    fn test_empty_text_is_inconclusive() {
        let result = keyword_match("", &ConditionCatalog::default());
        assert_eq!(result.diagnosis, INCONCLUSIVE_DIAGNOSIS);
    }
}
