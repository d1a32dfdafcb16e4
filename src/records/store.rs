use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use super::types::{DiagnosisRecord, NewDiagnosisRecord, RecordStatus};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid record: {0}")]
    Validation(String),
    #[error("Record store lock poisoned: {0}")]
    Lock(String),
}

/// Process-lifetime store of diagnosis records.
///
/// Records are only ever added; there is no update, delete or expiry.
#[derive(Default)]
pub struct RecordStore {
    records: RwLock<HashMap<String, DiagnosisRecord>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and stores a new record, returning it with its generated id.
    pub fn create(&self, new: NewDiagnosisRecord) -> Result<DiagnosisRecord, StoreError> {
        validate(&new)?;

        let mut records = self.records.write().map_err(|e| StoreError::Lock(e.to_string()))?;

        let mut id = Uuid::new_v4().to_string();
        while records.contains_key(&id) {
            id = Uuid::new_v4().to_string();
        }

        let record = DiagnosisRecord {
            id: id.clone(),
            created_at: Utc::now(),
            kind: new.kind,
            status: RecordStatus::Pending,
            patient_name: new.patient_name.filter(|n| !n.trim().is_empty()),
            description: new.description.trim().to_string(),
            notes: new.notes.filter(|n| !n.trim().is_empty()),
            result: new.result,
        };
        records.insert(id, record.clone());
        info!("Stored diagnosis record {} ({} total)", record.id, records.len());

        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<Option<DiagnosisRecord>, StoreError> {
        let records = self.records.read().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(records.get(id).cloned())
    }

    /// All records, newest first
    pub fn list(&self) -> Result<Vec<DiagnosisRecord>, StoreError> {
        let records = self.records.read().map_err(|e| StoreError::Lock(e.to_string()))?;
        let mut all: Vec<DiagnosisRecord> = records.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|e| StoreError::Lock(e.to_string()))?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

fn validate(new: &NewDiagnosisRecord) -> Result<(), StoreError> {
    if new.description.trim().is_empty() {
        return Err(StoreError::Validation("description must not be empty".to_string()));
    }
    if new.result.diagnosis.trim().is_empty() {
        return Err(StoreError::Validation("result.diagnosis must not be empty".to_string()));
    }
    if !(0.0..=100.0).contains(&new.result.confidence) {
        return Err(StoreError::Validation(format!(
            "result.confidence must be between 0 and 100, got {}",
            new.result.confidence
        )));
    }
    Ok(())
}
