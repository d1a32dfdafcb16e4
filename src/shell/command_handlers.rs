use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Response, Url};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::imaging::ImagePrediction;
use crate::records::{DiagnosisRecord, NewDiagnosisRecord, RecordKind, ResultSummary};
use crate::server::types::{ApiResponse, ErrorBody, SymptomsRequest};
use crate::symptoms::SymptomAnalysis;
use super::display::{
    display_image_prediction, display_record, display_records_table, display_symptom_analysis,
};

/// The most recent analysis, kept so it can be saved as a record
pub(super) struct LastAnalysis {
    pub kind: RecordKind,
    pub description: String,
    pub result: ResultSummary,
}

/// Shared resources and state references for the command handlers
pub(super) struct ShellContext<'a> {
    pub client: &'a Client,
    pub server_url: &'a str,
    pub last_analysis: &'a mut Option<LastAnalysis>,
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {wide_msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(Duration::from_millis(120));
    pb.set_message(message.to_string());
    pb
}

/// Reads a bare analysis body, or the `{"error": ...}` body on failure.
async fn read_analysis<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.context("Error reading response")?;
    if status.is_success() {
        return serde_json::from_str(&text).context("Failed to parse analysis result");
    }
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => bail!("{} ({})", body.error, status),
        Err(_) => bail!("Server responded with {}: {}", status, text),
    }
}

/// Reads an `ApiResponse` envelope and returns its data.
async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let envelope: ApiResponse<T> = response.json().await.context("Failed to parse server response")?;
    match envelope.data {
        Some(data) if envelope.status == "success" => Ok(data),
        _ => Err(anyhow!(
            "{} ({})",
            envelope.message.unwrap_or_else(|| "Request failed".to_string()),
            status
        )),
    }
}

pub(super) async fn handle_health(context: &ShellContext<'_>) -> Result<()> {
    let response = context
        .client
        .get(format!("{}/api/health", context.server_url))
        .send()
        .await
        .context("Error requesting health")?;
    let body: Value = response.json().await.context("Error reading response")?;
    match body.get("status").and_then(|s| s.as_str()) {
        Some("ok") => println!("{}", "Server is healthy".bright_green()),
        _ => println!("{} {}", "Unexpected health response:".yellow(), body),
    }
    Ok(())
}

pub(super) async fn handle_symptoms(context: &mut ShellContext<'_>, symptoms: &str) -> Result<()> {
    let pb = spinner("Analyzing symptoms...");
    let response = context
        .client
        .post(format!("{}/api/symptoms", context.server_url))
        .json(&SymptomsRequest { symptoms: symptoms.to_string() })
        .send()
        .await;
    pb.finish_and_clear();

    let analysis: SymptomAnalysis = read_analysis(response.context("Error sending symptoms")?).await?;
    display_symptom_analysis(&analysis);

    *context.last_analysis = Some(LastAnalysis {
        kind: RecordKind::Symptoms,
        description: symptoms.to_string(),
        result: ResultSummary::from(&analysis),
    });
    Ok(())
}

pub(super) async fn handle_image(context: &mut ShellContext<'_>, path: &str) -> Result<()> {
    let path = Path::new(path);
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload".to_string());

    let form = Form::new().part("image", Part::bytes(bytes).file_name(file_name.clone()));

    let pb = spinner(&format!("Classifying {}...", file_name));
    let response = context
        .client
        .post(format!("{}/api/predict", context.server_url))
        .multipart(form)
        .send()
        .await;
    pb.finish_and_clear();

    let prediction: ImagePrediction = read_analysis(response.context("Error uploading image")?).await?;
    display_image_prediction(&prediction);

    *context.last_analysis = Some(LastAnalysis {
        kind: RecordKind::Image,
        description: format!("Image {}", file_name),
        result: ResultSummary::from(&prediction),
    });
    Ok(())
}

pub(super) async fn handle_save(context: &mut ShellContext<'_>, notes: Option<&str>) -> Result<()> {
    let Some(last) = context.last_analysis.as_ref() else {
        println!("{}", "Nothing to save yet. Run 'symptoms' or 'image' first.".yellow());
        return Ok(());
    };

    let new_record = NewDiagnosisRecord {
        kind: last.kind,
        patient_name: None,
        description: last.description.clone(),
        notes: notes.map(|n| n.to_string()),
        result: last.result.clone(),
    };

    let response = context
        .client
        .post(format!("{}/api/diagnoses", context.server_url))
        .json(&new_record)
        .send()
        .await
        .context("Error saving record")?;
    let record: DiagnosisRecord = read_envelope(response).await?;

    println!("{} {}", "Saved record".bright_green(), record.id.bold());
    *context.last_analysis = None;
    Ok(())
}

pub(super) async fn handle_list_records(context: &ShellContext<'_>) -> Result<()> {
    let response = context
        .client
        .get(format!("{}/api/diagnoses", context.server_url))
        .send()
        .await
        .context("Error requesting records")?;
    let records: Vec<DiagnosisRecord> = read_envelope(response).await?;
    display_records_table(&records);
    Ok(())
}

/// URL of a single record, with `id` escaped as one path segment
fn record_url(server_url: &str, id: &str) -> Result<Url> {
    let mut url = Url::parse(&format!("{}/api/diagnoses", server_url))
        .with_context(|| format!("Invalid server URL {}", server_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Server URL {} cannot have a path", server_url))?
        .push(id);
    Ok(url)
}

pub(super) async fn handle_get_record(context: &ShellContext<'_>, id: &str) -> Result<()> {
    let response = context
        .client
        .get(record_url(context.server_url, id)?)
        .send()
        .await
        .context("Error requesting record")?;
    let record: DiagnosisRecord = read_envelope(response).await?;
    display_record(&record);
    Ok(())
}
