use crate::config::Endpoint;
use crate::error::StorageError;
use crate::prediction::PredictionResult;
use crate::presentation::{phase_name, CrackSeverity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const HISTORY_STORAGE_KEY: &str = "smart-cement.history";

/// One saved prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    /// Data-URL preview of the analysed image; strength predictions have none.
    pub image: Option<String>,
    pub result: PredictionResult,
    /// Human-readable local time of the prediction.
    pub date: String,
}

impl HistoryEntry {
    pub fn new(image: Option<String>, result: PredictionResult, date: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            result,
            date: date.into(),
        }
    }

    pub fn kind(&self) -> Endpoint {
        self.result.endpoint()
    }

    /// One-line description used as the card title and as search text.
    pub fn headline(&self) -> String {
        match &self.result {
            PredictionResult::ClinkerPhase(clinker) => format!(
                "{} ({})",
                clinker.predicted_class,
                phase_name(&clinker.predicted_class)
            ),
            PredictionResult::CrackDetection(crack) => {
                let severity =
                    CrackSeverity::classify(crack.metrics.has_crack, crack.metrics.crack_percentage);
                match severity {
                    CrackSeverity::None => "No crack detected".to_string(),
                    _ => format!(
                        "{} crack, {:.2}% of surface",
                        severity.label(),
                        crack.metrics.crack_percentage
                    ),
                }
            }
            PredictionResult::ParticleCount(particles) => {
                format!("{} particles", particles.counts.total())
            }
            PredictionResult::StrengthPrediction(strength) => format!(
                "28-day strength {:.2} MPa",
                strength.predictions.strength_28d
            ),
        }
    }
}

/// Where the history list is persisted.
pub trait HistoryBackend {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError>;
    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError>;
}

/// In-process backend, used when no browser storage is available.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: std::cell::RefCell<Vec<HistoryEntry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(&self) -> Vec<HistoryEntry> {
        self.entries.borrow().clone()
    }
}

impl HistoryBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<HistoryEntry>, StorageError> {
        Ok(self.entries.borrow().clone())
    }

    fn save(&self, entries: &[HistoryEntry]) -> Result<(), StorageError> {
        *self.entries.borrow_mut() = entries.to_vec();
        Ok(())
    }
}

/// Newest-first list of saved predictions. The backend is read once at open
/// and rewritten in full after every mutation; a failed write is logged and
/// the in-memory list stays authoritative.
#[derive(Debug)]
pub struct HistoryStore<B: HistoryBackend> {
    backend: B,
    entries: Vec<HistoryEntry>,
}

impl<B: HistoryBackend> HistoryStore<B> {
    pub fn open(backend: B) -> Self {
        let entries = backend.load().unwrap_or_else(|e| {
            log::warn!("Could not read prediction history, starting empty: {}", e);
            Vec::new()
        });
        Self { backend, entries }
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.insert(0, entry);
        self.persist();
    }

    /// Removes the entry at `index`; out of range is a no-op.
    pub fn remove(&mut self, index: usize) -> Option<HistoryEntry> {
        if index >= self.entries.len() {
            return None;
        }
        let removed = self.entries.remove(index);
        self.persist();
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_entries(&self.entries)
    }

    fn persist(&self) {
        if let Err(e) = self.backend.save(&self.entries) {
            log::error!("Failed to persist prediction history: {}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HistoryFilter {
    pub kind: Option<Endpoint>,
    pub search: String,
}

impl HistoryFilter {
    /// Kind must match exactly; search is a case-insensitive substring of
    /// the date, the kind label or the headline.
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if self.kind.is_some_and(|kind| kind != entry.kind()) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            entry.date.to_lowercase(),
            entry.kind().label().to_lowercase(),
            entry.headline().to_lowercase(),
        ]
        .iter()
        .any(|haystack| haystack.contains(&needle))
    }

    /// Matching entries together with their index in the full list, so a
    /// delete from a filtered view removes the right entry.
    pub fn select<'a>(
        &'a self,
        entries: &'a [HistoryEntry],
    ) -> impl Iterator<Item = (usize, &'a HistoryEntry)> + 'a {
        entries
            .iter()
            .enumerate()
            .filter(move |(_, entry)| self.matches(entry))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistorySummary {
    pub total: usize,
    pub cracks_detected: usize,
    pub average_strength_28d: Option<f64>,
    pub particles_counted: u64,
}

impl HistorySummary {
    pub fn from_entries(entries: &[HistoryEntry]) -> Self {
        let mut summary = HistorySummary {
            total: entries.len(),
            ..Default::default()
        };
        let mut strength_sum = 0.0;
        let mut strength_count = 0u32;

        for entry in entries {
            match &entry.result {
                PredictionResult::CrackDetection(crack) if crack.metrics.has_crack => {
                    summary.cracks_detected += 1;
                }
                PredictionResult::ParticleCount(particles) => {
                    summary.particles_counted += particles.counts.total();
                }
                PredictionResult::StrengthPrediction(strength) => {
                    strength_sum += strength.predictions.strength_28d;
                    strength_count += 1;
                }
                _ => {}
            }
        }

        if strength_count > 0 {
            summary.average_strength_28d = Some(strength_sum / f64::from(strength_count));
        }
        summary
    }
}
