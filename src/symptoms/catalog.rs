use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A condition the symptom analyzer can suggest
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    /// Name, also used as a zero-shot candidate label
    pub name: String,
    /// Lower-case phrases that indicate the condition
    pub keywords: Vec<String>,
    /// Advice returned with the diagnosis
    pub recommendation: String,
}

/// Ordered set of known conditions. Earlier entries win keyword ties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConditionCatalog {
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to access catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Catalog must contain at least one condition")]
    Empty,
    #[error("Duplicate condition in catalog: {0}")]
    Duplicate(String),
}

fn condition(name: &str, keywords: &[&str], recommendation: &str) -> Condition {
    Condition {
        name: name.to_string(),
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        recommendation: recommendation.to_string(),
    }
}

/// Built-in catalog of common conditions
pub static DEFAULT_CATALOG: Lazy<ConditionCatalog> = Lazy::new(|| ConditionCatalog {
    conditions: vec![
        condition(
            "Respiratory infection",
            &["cough", "fever", "shortness of breath", "sore throat", "runny nose"],
            "Rest, fluids, and monitor symptoms. Seek medical attention if breathing difficulties occur.",
        ),
        condition(
            "Migraine",
            &["headache", "sensitivity to light", "nausea", "blurred vision"],
            "Rest in a quiet, dark room. Take prescribed medication at onset of symptoms.",
        ),
        condition(
            "Gastrointestinal issue",
            &["abdominal pain", "diarrhea", "nausea", "vomiting", "bloating"],
            "Stay hydrated, follow the BRAT diet (bananas, rice, applesauce, toast). Seek help if severe or persistent.",
        ),
        condition(
            "Allergic reaction",
            &["itching", "rash", "swelling", "runny nose", "watery eyes"],
            "Avoid allergen if known, take antihistamines. For severe reactions, seek immediate medical attention.",
        ),
        condition(
            "Common cold",
            &["runny nose", "cough", "sneezing", "sore throat", "mild fever"],
            "Rest, fluids, over-the-counter cold medications for symptom relief.",
        ),
    ],
});

impl Default for ConditionCatalog {
    fn default() -> Self {
        DEFAULT_CATALOG.clone()
    }
}

impl ConditionCatalog {
    /// Reads a catalog from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let mut catalog: ConditionCatalog = serde_json::from_str(&content)?;
        // Matching is done on lower-cased text
        for condition in &mut catalog.conditions {
            for keyword in &mut condition.keywords {
                *keyword = keyword.trim().to_lowercase();
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Writes the catalog as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.conditions.is_empty() {
            return Err(CatalogError::Empty);
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            if self.conditions[..i].iter().any(|c| c.name == condition.name) {
                return Err(CatalogError::Duplicate(condition.name.clone()));
            }
        }
        Ok(())
    }

    /// Condition names, in catalog order
    pub fn labels(&self) -> Vec<String> {
        self.conditions.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Condition> {
        self.conditions.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("medi-catalog-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    #[test]
    fn test_default_catalog_order() {
        let catalog = ConditionCatalog::default();
        assert_eq!(
            catalog.labels(),
            vec![
                "Respiratory infection",
                "Migraine",
                "Gastrointestinal issue",
                "Allergic reaction",
                "Common cold",
            ]
        );
        assert!(catalog.get("Migraine").unwrap().keywords.contains(&"headache".to_string()));
        assert!(catalog.get("Flu").is_none());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("catalog.json");
        let catalog = ConditionCatalog::default();
        catalog.save(&path).unwrap();
        assert_eq!(ConditionCatalog::load(&path).unwrap(), catalog);
    }

    #[test]
    fn test_load_lowercases_keywords() {
        let path = temp_path("custom.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"conditions": [{"name": "Sunburn", "keywords": [" Red Skin "], "recommendation": "Stay in the shade."}]}"#,
        )
        .unwrap();
        let catalog = ConditionCatalog::load(&path).unwrap();
        assert_eq!(catalog.conditions[0].keywords, vec!["red skin"]);
    }

    #[test]
    fn test_load_rejects_empty() {
        let path = temp_path("empty.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"conditions": []}"#).unwrap();
        assert!(matches!(ConditionCatalog::load(&path), Err(CatalogError::Empty)));
    }

    #[test]
    fn test_load_rejects_duplicates() {
        let path = temp_path("dup.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"conditions": [
                {"name": "A", "keywords": ["x"], "recommendation": "r"},
                {"name": "A", "keywords": ["y"], "recommendation": "r"}
            ]}"#,
        )
        .unwrap();
        assert!(matches!(ConditionCatalog::load(&path), Err(CatalogError::Duplicate(name)) if name == "A"));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ConditionCatalog::load(&temp_path("missing.json")),
            Err(CatalogError::Io(_))
        ));
    }
}
