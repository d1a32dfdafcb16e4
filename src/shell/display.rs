use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};
use colored::*;

use crate::imaging::ImagePrediction;
use crate::records::DiagnosisRecord;
use crate::symptoms::SymptomAnalysis;

fn header(title: &str) -> Cell {
    Cell::new(title).fg(comfy_table::Color::Cyan).add_attribute(Attribute::Bold)
}

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(comfy_table::presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn confidence_cell(confidence: f32) -> Cell {
    let color = if confidence >= 70.0 {
        comfy_table::Color::Green
    } else if confidence >= 40.0 {
        comfy_table::Color::Yellow
    } else {
        comfy_table::Color::Red
    };
    Cell::new(format!("{:.1}%", confidence)).fg(color).set_alignment(CellAlignment::Right)
}

/// Shows the result of a symptom analysis, with the differential if present.
pub fn display_symptom_analysis(analysis: &SymptomAnalysis) {
    let mut table = new_table();
    table.set_header(vec![header("Diagnosis"), header("Confidence"), header("Model")]);
    table.add_row(vec![
        Cell::new(&analysis.diagnosis).fg(comfy_table::Color::Green).add_attribute(Attribute::Bold),
        confidence_cell(analysis.confidence),
        Cell::new(&analysis.model_used).fg(comfy_table::Color::Magenta),
    ]);

    if let Some(differential) = &analysis.differential_diagnosis {
        let mut others: Vec<(&String, &f32)> = differential.iter().collect();
        others.sort_by(|a, b| b.1.total_cmp(a.1));
        for (condition, score) in others {
            table.add_row(vec![
                Cell::new(format!("  {}", condition)).fg(comfy_table::Color::DarkGrey),
                confidence_cell(*score),
                Cell::new("differential").fg(comfy_table::Color::DarkGrey),
            ]);
        }
    }

    println!("\n{}", table);
    println!("{} {}", "Recommendation:".bright_cyan().bold(), analysis.recommendation);
    if let Some(error) = &analysis.model_error {
        println!("{} {}", "Model unavailable:".yellow(), error);
    }
}

/// Shows every class probability, most likely first.
pub fn display_image_prediction(prediction: &ImagePrediction) {
    let mut table = new_table();
    table.set_header(vec![header("Condition"), header("Probability")]);

    let mut rows: Vec<(&String, &f32)> = prediction.all_probabilities.iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(a.1));
    for (label, probability) in rows {
        let name = if *label == prediction.diagnosis {
            Cell::new(label).fg(comfy_table::Color::Green).add_attribute(Attribute::Bold)
        } else {
            Cell::new(label)
        };
        table.add_row(vec![name, confidence_cell(*probability)]);
    }

    println!("\n{}", table);
    println!(
        "{} {} ({:.1}%)",
        "Diagnosis:".bright_cyan().bold(),
        prediction.diagnosis.bright_green(),
        prediction.confidence
    );
}

/// Displays a table of stored diagnosis records.
pub fn display_records_table(records: &[DiagnosisRecord]) {
    if records.is_empty() {
        println!("{}", "No diagnosis records stored".yellow());
        return;
    }

    let mut table = new_table();
    table.set_header(vec![
        header("ID"),
        header("Created"),
        header("Kind"),
        header("Patient"),
        header("Diagnosis"),
        header("Confidence"),
        header("Status"),
    ]);

    for record in records {
        table.add_row(vec![
            Cell::new(&record.id).fg(comfy_table::Color::White),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S").to_string()).fg(comfy_table::Color::DarkGrey),
            Cell::new(format!("{:?}", record.kind).to_lowercase()).set_alignment(CellAlignment::Center),
            Cell::new(record.patient_name.as_deref().unwrap_or("-")).fg(comfy_table::Color::Yellow),
            Cell::new(&record.result.diagnosis).fg(comfy_table::Color::Green),
            confidence_cell(record.result.confidence),
            Cell::new(format!("{:?}", record.status).to_lowercase()).fg(comfy_table::Color::Blue),
        ]);
    }

    println!("\n{}", table);
    println!("{}", format!("Total records: {}", records.len()).bright_green());
}

/// Displays one record in full.
pub fn display_record(record: &DiagnosisRecord) {
    let mut table = new_table();
    table.set_header(vec![header("Field"), header("Value")]);

    let mut add = |field: &str, value: String| {
        table.add_row(vec![Cell::new(field).fg(comfy_table::Color::Cyan), Cell::new(value)]);
    };
    add("ID", record.id.clone());
    add("Created", record.created_at.to_rfc3339());
    add("Kind", format!("{:?}", record.kind).to_lowercase());
    add("Status", format!("{:?}", record.status).to_lowercase());
    add("Patient", record.patient_name.clone().unwrap_or_else(|| "-".to_string()));
    add("Description", record.description.clone());
    add("Notes", record.notes.clone().unwrap_or_else(|| "-".to_string()));
    add("Diagnosis", record.result.diagnosis.clone());
    add("Confidence", format!("{:.1}%", record.result.confidence));
    if let Some(recommendation) = &record.result.recommendation {
        add("Recommendation", recommendation.clone());
    }
    if let Some(model) = &record.result.model_used {
        add("Model", model.clone());
    }

    println!("\n{}", table);
}
