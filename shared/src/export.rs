use crate::error::StorageError;
use crate::prediction::{PredictionResult, StrengthResponse};
use crate::presentation::{ClinkerSummary, CrackSummary, ParticleSummary};
use crate::strength::strength_cards;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
}

/// A file ready to hand to the browser as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub contents: String,
}

pub fn export(
    result: &PredictionResult,
    format: ExportFormat,
    timestamp_ms: u64,
) -> Result<ExportFile, StorageError> {
    match format {
        ExportFormat::Json => Ok(ExportFile {
            file_name: format!("cement-analysis-{}.json", timestamp_ms),
            mime_type: "application/json",
            contents: serde_json::to_string_pretty(&result.raw_json()?)?,
        }),
        ExportFormat::Text => Ok(ExportFile {
            file_name: format!("cement-report-{}.txt", timestamp_ms),
            mime_type: "text/plain",
            contents: text_report(result),
        }),
    }
}

pub fn text_report(result: &PredictionResult) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = match result {
        PredictionResult::ClinkerPhase(prediction) => {
            clinker_report(&mut out, &ClinkerSummary::new(prediction))
        }
        PredictionResult::CrackDetection(detection) => {
            crack_report(&mut out, &CrackSummary::new(detection), detection.threshold)
        }
        PredictionResult::ParticleCount(analysis) => {
            particle_report(&mut out, &ParticleSummary::new(analysis))
        }
        PredictionResult::StrengthPrediction(response) => strength_report(&mut out, response),
    };
    out.trim().to_string()
}

fn clinker_report(out: &mut String, summary: &ClinkerSummary) -> std::fmt::Result {
    writeln!(out, "CEMENT CLINKER ANALYSIS REPORT")?;
    writeln!(out, "================================")?;
    writeln!(out)?;
    writeln!(out, "Detected Phase: {}", summary.phase)?;
    writeln!(out, "Full Name: {}", summary.name)?;
    writeln!(out, "Confidence: {}", summary.confidence)?;
    writeln!(out, "Processing Time: {}", summary.processing_time)?;
    writeln!(
        out,
        "Analysis Date: {}",
        summary.analysis_time.as_deref().unwrap_or("N/A")
    )?;
    writeln!(out)?;
    writeln!(out, "ALL PROBABILITIES:")?;
    for row in &summary.probabilities {
        writeln!(out, "{}: {}", row.phase, row.percent)?;
    }
    writeln!(out)?;
    writeln!(out, "Description: {}", summary.info.description)
}

fn crack_report(
    out: &mut String,
    summary: &CrackSummary,
    threshold: Option<f64>,
) -> std::fmt::Result {
    writeln!(out, "CRACK DETECTION REPORT")?;
    writeln!(out, "======================")?;
    writeln!(out)?;
    writeln!(out, "Status: {}", summary.status)?;
    writeln!(out, "Severity: {}", summary.severity.label())?;
    writeln!(out, "Crack Area: {}", summary.crack_percentage)?;
    writeln!(out, "Crack Pixels: {}", summary.crack_pixels)?;
    if let Some(total) = summary.total_pixels {
        writeln!(out, "Total Pixels: {}", total)?;
    }
    if let Some(threshold) = threshold {
        writeln!(out, "Threshold: {:.2}", threshold)?;
    }
    writeln!(out)?;
    writeln!(out, "Message: {}", summary.message)
}

fn strength_report(out: &mut String, response: &StrengthResponse) -> std::fmt::Result {
    writeln!(out, "CEMENT STRENGTH PREDICTION REPORT")?;
    writeln!(out, "=================================")?;
    writeln!(out)?;
    for card in strength_cards(&response.predictions) {
        writeln!(out, "{}: {}", card.label, card.strength)?;
    }
    writeln!(out)?;
    writeln!(out, "Model: {}", response.predictions.model_used)?;
    writeln!(
        out,
        "Confidence: {}",
        response.predictions.confidence.as_deref().unwrap_or("N/A")
    )?;
    writeln!(
        out,
        "Engineered features: {}",
        response.engineered_features_count
    )
}

fn particle_report(out: &mut String, summary: &ParticleSummary) -> std::fmt::Result {
    writeln!(out, "RAW MEAL PARTICLE REPORT")?;
    writeln!(out, "========================")?;
    writeln!(out)?;
    for row in &summary.rows {
        writeln!(out, "{}: {} ({})", row.label, row.count, row.share)?;
    }
    writeln!(out, "Total: {}", summary.total)
}
