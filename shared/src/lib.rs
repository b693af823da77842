//! Domain logic for the Smart Cement research dashboard.
//!
//! Everything here is target independent so it can be unit tested natively;
//! the `frontend` crate only adds browser glue on top of these types.

pub mod camera;
pub mod config;
pub mod error;
pub mod export;
pub mod history;
pub mod media;
pub mod navigation;
pub mod prediction;
pub mod presentation;
pub mod strength;
pub mod validation;
pub mod workflow;

pub use config::{Endpoint, EndpointConfig, Settings, Theme};
pub use error::{ApiError, StorageError};
pub use history::{HistoryEntry, HistoryStore};
pub use navigation::{AppState, Route};
pub use prediction::{
    ClinkerPrediction, CrackDetection, CrackMetrics, ParticleAnalysis, ParticleCounts,
    PredictionResult, StrengthInput, StrengthPredictions, StrengthResponse,
};
pub use validation::{FileMeta, ValidationError};
pub use workflow::{Milestone, Ticket, UploadWorkflow, WorkflowState};
