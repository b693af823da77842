//! View models for the result cards. The frontend renders these directly so
//! every number and label shown on screen is computed here.

use crate::prediction::{ClinkerPrediction, CrackDetection, ParticleAnalysis};
use chrono::{DateTime, NaiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseInfo {
    pub name: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub significance: &'static [&'static str],
}

const UNKNOWN_COLOR: &str = "#6b7280";

/// Display details for a clinker phase code. Unknown codes fall back to the
/// code itself in grey.
pub fn phase_info(code: &str) -> PhaseInfo {
    match code {
        "C2S" => PhaseInfo {
            name: "Belite (Dicalcium Silicate)",
            color: "#3b82f6",
            description: "Contributes to long-term strength development",
            significance: &[
                "Contributes to long-term strength and durability",
                "Lower heat of hydration compared to C3S",
            ],
        },
        "C3S" => PhaseInfo {
            name: "Alite (Tricalcium Silicate)",
            color: "#10b981",
            description: "Primary contributor to early strength",
            significance: &[
                "High early strength development expected",
                "Primary component for rapid setting applications",
            ],
        },
        "C3A" => PhaseInfo {
            name: "Tricalcium Aluminate",
            color: "#f59e0b",
            description: "Affects setting time and heat generation",
            significance: &[
                "Fast hydration rate affects setting time",
                "High heat generation during hydration",
                "Susceptible to sulfate attack",
            ],
        },
        "C4AF" => PhaseInfo {
            name: "Brownmillerite (Tetracalcium Aluminoferrite)",
            color: "#ef4444",
            description: "Contributes to color and minor strength",
            significance: &[
                "Provides characteristic gray color to cement",
                "Minor contribution to strength development",
            ],
        },
        _ => PhaseInfo {
            name: "",
            color: UNKNOWN_COLOR,
            description: "Unknown phase",
            significance: &[],
        },
    }
}

/// Name to show for a phase: the table name, or the raw code when unknown.
pub fn phase_name(code: &str) -> String {
    let info = phase_info(code);
    if info.name.is_empty() {
        code.to_string()
    } else {
        info.name.to_string()
    }
}

pub fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Renders an ISO-8601 timestamp as `YYYY-MM-DD HH:MM:SS`, keeping the raw
/// text when it does not parse.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.format("%Y-%m-%d %H:%M:%S").to_string();
    }
    match NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(parsed) => parsed.format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityRow {
    pub phase: String,
    pub name: String,
    pub color: &'static str,
    pub percent: String,
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClinkerSummary {
    pub phase: String,
    pub info: PhaseInfo,
    pub name: String,
    pub confidence: String,
    pub confidence_width: f64,
    pub probabilities: Vec<ProbabilityRow>,
    pub processing_time: String,
    pub analysis_time: Option<String>,
    pub filename: Option<String>,
}

impl ClinkerSummary {
    pub fn new(prediction: &ClinkerPrediction) -> Self {
        let info = phase_info(&prediction.predicted_class);

        let mut probabilities: Vec<ProbabilityRow> = prediction
            .all_probabilities
            .iter()
            .map(|(phase, probability)| ProbabilityRow {
                phase: phase.clone(),
                name: phase_name(phase),
                color: phase_info(phase).color,
                percent: percent(*probability),
                width: bar_width(*probability),
            })
            .collect();
        probabilities.sort_by(|a, b| b.width.total_cmp(&a.width));

        Self {
            phase: prediction.predicted_class.clone(),
            info,
            name: phase_name(&prediction.predicted_class),
            confidence: percent(prediction.confidence),
            confidence_width: bar_width(prediction.confidence),
            probabilities,
            processing_time: prediction
                .processing_time_ms
                .map(|ms| format!("{:.2} ms", ms))
                .unwrap_or_else(|| "N/A".to_string()),
            analysis_time: prediction.timestamp.as_deref().map(format_timestamp),
            filename: prediction.filename.clone(),
        }
    }
}

fn bar_width(fraction: f64) -> f64 {
    (fraction * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CrackSeverity {
    None,
    Minor,
    Moderate,
    Severe,
}

impl CrackSeverity {
    pub fn classify(has_crack: bool, crack_percentage: f64) -> Self {
        if !has_crack {
            CrackSeverity::None
        } else if crack_percentage < 1.0 {
            CrackSeverity::Minor
        } else if crack_percentage < 5.0 {
            CrackSeverity::Moderate
        } else {
            CrackSeverity::Severe
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CrackSeverity::None => "No crack",
            CrackSeverity::Minor => "Minor",
            CrackSeverity::Moderate => "Moderate",
            CrackSeverity::Severe => "Severe",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            CrackSeverity::None => "severity-none",
            CrackSeverity::Minor => "severity-minor",
            CrackSeverity::Moderate => "severity-moderate",
            CrackSeverity::Severe => "severity-severe",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrackSummary {
    pub status: &'static str,
    pub message: String,
    pub severity: CrackSeverity,
    pub crack_percentage: String,
    pub crack_pixels: u64,
    pub total_pixels: Option<u64>,
    pub mask_url: String,
}

impl CrackSummary {
    pub fn new(detection: &CrackDetection) -> Self {
        let metrics = &detection.metrics;
        Self {
            status: if metrics.has_crack {
                "Crack detected"
            } else {
                "No crack detected"
            },
            message: detection.message.clone(),
            severity: CrackSeverity::classify(metrics.has_crack, metrics.crack_percentage),
            crack_percentage: format!("{:.2}%", metrics.crack_percentage),
            crack_pixels: metrics.crack_pixels,
            total_pixels: metrics.total_pixels,
            mask_url: crate::media::mask_data_url(&detection.mask_base64),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleRow {
    pub label: &'static str,
    pub css_class: &'static str,
    pub count: u32,
    pub share: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSummary {
    pub rows: Vec<ParticleRow>,
    pub total: u64,
}

impl ParticleSummary {
    pub fn new(analysis: &ParticleAnalysis) -> Self {
        let counts = analysis.counts;
        let total = counts.total();
        let share = |count: u32| {
            if total == 0 {
                "0.0%".to_string()
            } else {
                format!("{:.1}%", f64::from(count) / total as f64 * 100.0)
            }
        };
        let rows = [
            ("Dark Red", "particle-dark-red", counts.dark_red),
            ("Light Red", "particle-light-red", counts.light_red),
            ("White", "particle-white", counts.white),
        ]
        .into_iter()
        .map(|(label, css_class, count)| ParticleRow {
            label,
            css_class,
            count,
            share: share(count),
        })
        .collect();

        Self { rows, total }
    }
}
