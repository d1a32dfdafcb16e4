mod store;
mod types;

pub use store::{RecordStore, StoreError};
pub use types::{DiagnosisRecord, NewDiagnosisRecord, RecordKind, RecordStatus, ResultSummary};
