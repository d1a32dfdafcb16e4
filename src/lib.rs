//! Medical analysis API: image classification, symptom analysis and an
//! in-memory store for the resulting diagnoses.

pub mod config;
pub mod imaging;
pub mod records;
pub mod server;
pub mod shell;
pub mod symptoms;
