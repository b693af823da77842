use crate::camera::{CameraSession, MediaTracks};
use crate::error::ApiError;
use crate::prediction::PredictionResult;
use crate::validation::{validate_image, FileMeta, ValidationError};
use thiserror::Error;

/// Synthetic progress points reported while a request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Milestone {
    Sending,
    InFlight,
    Parsing,
    Done,
}

impl Milestone {
    pub fn percent(&self) -> u8 {
        match self {
            Milestone::Sending => 20,
            Milestone::InFlight => 60,
            Milestone::Parsing => 90,
            Milestone::Done => 100,
        }
    }

    pub fn caption(&self) -> &'static str {
        match self {
            Milestone::Sending => "Uploading image...",
            Milestone::InFlight => "Running the model...",
            Milestone::Parsing => "Reading results...",
            Milestone::Done => "Done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowState {
    Idle,
    Previewing,
    Analyzing { progress: u8 },
    Completed,
    Failed {
        message: String,
        remediation: &'static [&'static str],
    },
}

impl WorkflowState {
    pub fn is_analyzing(&self) -> bool {
        matches!(self, WorkflowState::Analyzing { .. })
    }
}

/// Identifies the candidate and request a pending callback belongs to.
/// Callbacks holding an outdated ticket are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    candidate: u64,
    request: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadCandidate<F> {
    pub file: F,
    pub meta: FileMeta,
    pub preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    #[error("An analysis is already in progress")]
    Busy,
    #[error("Please select an image first")]
    NoCandidate,
    #[error("The image preview is still loading")]
    PreviewPending,
    #[error("There is no failed analysis to retry")]
    NothingToRetry,
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Select → preview → analyze → result state machine for one image
/// endpoint. `F` is the platform file handle that gets uploaded.
#[derive(Debug, Clone)]
pub struct UploadWorkflow<F> {
    base_url: String,
    state: WorkflowState,
    candidate: Option<UploadCandidate<F>>,
    result: Option<PredictionResult>,
    notice: Option<String>,
    candidate_generation: u64,
    request_generation: u64,
}

impl<F> UploadWorkflow<F> {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            state: WorkflowState::Idle,
            candidate: None,
            result: None,
            notice: None,
            candidate_generation: 0,
            request_generation: 0,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn candidate(&self) -> Option<&UploadCandidate<F>> {
        self.candidate.as_ref()
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    /// Validation message from the last rejected selection.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// A candidate with its preview decoded and nothing in flight.
    pub fn is_ready(&self) -> bool {
        !self.state.is_analyzing()
            && self
                .candidate
                .as_ref()
                .is_some_and(|candidate| candidate.preview.is_some())
    }

    pub fn progress(&self) -> Option<u8> {
        match self.state {
            WorkflowState::Analyzing { progress } => Some(progress),
            _ => None,
        }
    }

    /// Validates and installs a new candidate, dropping any previous
    /// candidate and result. A rejected file only updates the notice.
    pub fn select(&mut self, file: F, meta: FileMeta) -> Result<Ticket, WorkflowError> {
        if self.state.is_analyzing() {
            return Err(WorkflowError::Busy);
        }
        if let Err(err) = validate_image(Some(&meta)) {
            self.notice = Some(err.to_string());
            return Err(err.into());
        }

        self.candidate_generation += 1;
        self.request_generation += 1;
        self.candidate = Some(UploadCandidate {
            file,
            meta,
            preview: None,
        });
        self.result = None;
        self.notice = None;
        self.state = WorkflowState::Previewing;
        Ok(self.ticket())
    }

    /// Stores the decoded preview if the ticket's candidate is still the
    /// current one.
    pub fn attach_preview(&mut self, ticket: Ticket, data_url: String) -> bool {
        if ticket.candidate != self.candidate_generation {
            return false;
        }
        match self.candidate.as_mut() {
            Some(candidate) => {
                candidate.preview = Some(data_url);
                true
            }
            None => false,
        }
    }

    pub fn begin(&mut self) -> Result<Ticket, WorkflowError> {
        if self.state.is_analyzing() {
            return Err(WorkflowError::Busy);
        }
        match &self.candidate {
            None => return Err(WorkflowError::NoCandidate),
            Some(candidate) if candidate.preview.is_none() => {
                return Err(WorkflowError::PreviewPending);
            }
            Some(_) => {}
        }

        self.request_generation += 1;
        self.result = None;
        self.notice = None;
        self.state = WorkflowState::Analyzing { progress: 0 };
        Ok(self.ticket())
    }

    /// Starts the analysis from a page that may still show the camera. The
    /// progress screen has no camera view, so the stream is stopped once
    /// the request is accepted.
    pub fn begin_with_camera<S: MediaTracks>(
        &mut self,
        camera: &mut CameraSession<S>,
    ) -> Result<Ticket, WorkflowError> {
        let ticket = self.begin()?;
        camera.release();
        Ok(ticket)
    }

    /// Progress only moves forward.
    pub fn advance(&mut self, ticket: Ticket, milestone: Milestone) -> bool {
        if !self.is_pending(ticket) {
            return false;
        }
        if let WorkflowState::Analyzing { progress } = &mut self.state {
            *progress = (*progress).max(milestone.percent());
        }
        true
    }

    pub fn complete(&mut self, ticket: Ticket, result: PredictionResult) -> bool {
        if !self.is_pending(ticket) {
            log::debug!("Dropping stale prediction response");
            return false;
        }
        self.result = Some(result);
        self.state = WorkflowState::Completed;
        true
    }

    pub fn fail(&mut self, ticket: Ticket, error: &ApiError) -> bool {
        if !self.is_pending(ticket) {
            log::debug!("Dropping stale prediction failure: {}", error);
            return false;
        }
        self.state = WorkflowState::Failed {
            message: error.user_message(&self.base_url),
            remediation: error.remediation_steps(),
        };
        true
    }

    /// Re-submits the same candidate after a failure.
    pub fn retry(&mut self) -> Result<Ticket, WorkflowError> {
        if !matches!(self.state, WorkflowState::Failed { .. }) {
            return Err(WorkflowError::NothingToRetry);
        }
        self.begin()
    }

    pub fn reset(&mut self) {
        self.candidate_generation += 1;
        self.request_generation += 1;
        self.candidate = None;
        self.result = None;
        self.notice = None;
        self.state = WorkflowState::Idle;
    }

    pub fn is_pending(&self, ticket: Ticket) -> bool {
        self.state.is_analyzing() && ticket == self.ticket()
    }

    fn ticket(&self) -> Ticket {
        Ticket {
            candidate: self.candidate_generation,
            request: self.request_generation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::{ParticleAnalysis, ParticleCounts};
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingStream(Rc<Cell<u32>>);

    impl MediaTracks for CountingStream {
        fn stop_tracks(&self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn png(size: u64) -> FileMeta {
        FileMeta::new("meal.png", "image/png", size)
    }

    fn select_ready<F>(flow: &mut UploadWorkflow<F>, file: F, meta: FileMeta) -> Ticket {
        let ticket = flow.select(file, meta).unwrap();
        assert!(flow.attach_preview(ticket, "data:image/png;base64,AA==".into()));
        ticket
    }

    fn particles() -> PredictionResult {
        PredictionResult::ParticleCount(ParticleAnalysis {
            counts: ParticleCounts {
                dark_red: 4,
                light_red: 5,
                white: 6,
            },
            filename: None,
        })
    }

    #[test]
    fn select_enters_previewing() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        let ticket = flow.select(1u8, png(2048)).unwrap();
        assert_eq!(flow.state(), &WorkflowState::Previewing);
        assert!(flow.attach_preview(ticket, "data:image/png;base64,AA==".into()));
        assert_eq!(
            flow.candidate().and_then(|c| c.preview.as_deref()),
            Some("data:image/png;base64,AA==")
        );
    }

    #[test]
    fn invalid_selection_only_sets_notice() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        flow.select(1u8, png(10)).unwrap();

        let err = flow
            .select(2u8, FileMeta::new("a.gif", "image/gif", 10))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert_eq!(flow.state(), &WorkflowState::Previewing);
        assert_eq!(flow.candidate().map(|c| c.file), Some(1));
        assert_eq!(
            flow.notice(),
            Some("Invalid file type. Please upload a JPG or PNG image.")
        );
    }

    #[test]
    fn progress_follows_milestones() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        select_ready(&mut flow, (), png(10));
        let ticket = flow.begin().unwrap();
        assert_eq!(flow.progress(), Some(0));
        for milestone in [Milestone::Sending, Milestone::InFlight, Milestone::Parsing] {
            assert!(flow.advance(ticket, milestone));
            assert_eq!(flow.progress(), Some(milestone.percent()));
        }
        flow.advance(ticket, Milestone::Sending);
        assert_eq!(flow.progress(), Some(90));
    }

    #[test]
    fn only_one_request_in_flight() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        select_ready(&mut flow, (), png(10));
        flow.begin().unwrap();
        assert_eq!(flow.begin(), Err(WorkflowError::Busy));
        assert_eq!(flow.select((), png(10)), Err(WorkflowError::Busy));
    }

    #[test]
    fn begin_without_candidate_is_refused() {
        let mut flow: UploadWorkflow<()> = UploadWorkflow::new("http://localhost:8000");
        assert_eq!(flow.begin(), Err(WorkflowError::NoCandidate));
        assert_eq!(flow.state(), &WorkflowState::Idle);
    }

    #[test]
    fn failure_then_retry() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        select_ready(&mut flow, (), png(10));
        let first = flow.begin().unwrap();
        assert!(flow.fail(first, &ApiError::Network("Failed to fetch".into())));
        match flow.state() {
            WorkflowState::Failed {
                message,
                remediation,
            } => {
                assert!(message.starts_with("Cannot connect to server"));
                assert!(message.ends_with("http://localhost:8000"));
                assert!(!remediation.is_empty());
            }
            other => panic!("unexpected state {:?}", other),
        }

        let second = flow.retry().unwrap();
        assert_ne!(first, second);
        assert!(flow.complete(second, particles()));
        assert_eq!(flow.state(), &WorkflowState::Completed);
        assert_eq!(flow.retry(), Err(WorkflowError::NothingToRetry));
    }

    #[test]
    fn responses_after_reset_are_ignored() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        let selected = select_ready(&mut flow, (), png(10));
        let ticket = flow.begin().unwrap();
        flow.reset();

        assert!(!flow.complete(ticket, particles()));
        assert!(!flow.fail(ticket, &ApiError::Parse("x".into())));
        assert!(!flow.attach_preview(selected, "data:".into()));
        assert_eq!(flow.state(), &WorkflowState::Idle);
        assert!(flow.result().is_none());
        assert!(flow.candidate().is_none());
    }

    #[test]
    fn new_selection_clears_previous_result() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        select_ready(&mut flow, 1u8, png(10));
        let ticket = flow.begin().unwrap();
        flow.complete(ticket, particles());
        assert!(flow.result().is_some());

        let old_preview = ticket;
        flow.select(2u8, png(20)).unwrap();
        assert!(flow.result().is_none());
        assert_eq!(flow.state(), &WorkflowState::Previewing);
        assert!(!flow.attach_preview(old_preview, "data:".into()));
    }

    #[test]
    fn analysis_waits_for_preview() {
        let mut flow = UploadWorkflow::new("http://localhost:8000");
        let ticket = flow.select((), png(10)).unwrap();
        assert!(!flow.is_ready());
        assert_eq!(flow.begin(), Err(WorkflowError::PreviewPending));
        assert_eq!(flow.state(), &WorkflowState::Previewing);

        flow.attach_preview(ticket, "data:image/png;base64,AA==".into());
        assert!(flow.is_ready());
        flow.begin().unwrap();
        assert!(!flow.is_ready());
    }

    #[test]
    fn starting_analysis_closes_open_camera() {
        let stopped = Rc::new(Cell::new(0));
        let mut camera = CameraSession::new();
        camera.attach(CountingStream(Rc::clone(&stopped)));

        let mut flow = UploadWorkflow::new("http://localhost:8000");
        let ticket = flow.select((), png(10)).unwrap();
        assert_eq!(
            flow.begin_with_camera(&mut camera),
            Err(WorkflowError::PreviewPending)
        );
        assert!(camera.is_active());

        flow.attach_preview(ticket, "data:image/png;base64,AA==".into());
        flow.begin_with_camera(&mut camera).unwrap();
        assert!(flow.state().is_analyzing());
        assert!(!camera.is_active());
        assert_eq!(stopped.get(), 1);
    }
}
