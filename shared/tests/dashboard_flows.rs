use shared::config::EndpointConfig;
use shared::history::{HistoryFilter, MemoryBackend};
use shared::prediction::parse_response;
use shared::strength::{strength_cards, StrengthForm};
use shared::workflow::WorkflowError;
use shared::{
    ApiError, Endpoint, FileMeta, HistoryEntry, HistoryStore, Milestone, PredictionResult,
    StrengthInput, UploadWorkflow, ValidationError, WorkflowState,
};

const BASE: &str = "http://localhost:8000";

const PARTICLE_BODY: &str = r#"{"filename":"meal.jpg","counts":{"dark_red":12,"light_red":30,"white":8}}"#;

const STRENGTH_BODY: &str = r#"{
    "success": true,
    "message": "Prediction successful",
    "predictions": {
        "strength_1d": 5.0,
        "strength_2d": 8.0,
        "strength_7d": 18.0,
        "strength_28d": 32.0,
        "strength_56d": 38.0,
        "model_used": "XGBoost + LightGBM Ensemble",
        "confidence": "High"
    },
    "engineered_features_count": 22
}"#;

fn jpeg(size: u64) -> FileMeta {
    FileMeta::new("meal.jpg", "image/jpeg", size)
}

#[test]
fn invalid_files_never_reach_analysis() {
    let mut flow: UploadWorkflow<&str> = UploadWorkflow::new(BASE);

    let err = flow
        .select("big", jpeg(10 * 1024 * 1024 + 1))
        .unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Validation(ValidationError::TooLarge { .. })
    ));
    assert_eq!(flow.state(), &WorkflowState::Idle);
    assert_eq!(flow.begin(), Err(WorkflowError::NoCandidate));

    flow.select("exact", jpeg(10 * 1024 * 1024)).unwrap();
    assert_eq!(flow.state(), &WorkflowState::Previewing);
}

#[test]
fn successful_analysis_prepends_one_history_entry_with_preview() {
    let mut history = HistoryStore::open(MemoryBackend::new());
    history.append(HistoryEntry::new(
        None,
        parse_response(Endpoint::StrengthPrediction, STRENGTH_BODY).unwrap(),
        "earlier",
    ));

    let mut flow = UploadWorkflow::new(BASE);
    let selected = flow.select("meal.jpg", jpeg(4096)).unwrap();
    let preview = "data:image/jpeg;base64,/9j/4AAQ".to_string();
    flow.attach_preview(selected, preview.clone());

    let ticket = flow.begin().unwrap();
    flow.advance(ticket, Milestone::Sending);
    flow.advance(ticket, Milestone::InFlight);
    let result = parse_response(Endpoint::ParticleCount, PARTICLE_BODY).unwrap();
    flow.advance(ticket, Milestone::Parsing);
    assert!(flow.complete(ticket, result.clone()));

    let image = flow.candidate().and_then(|c| c.preview.clone());
    history.append(HistoryEntry::new(image, result, "now"));

    assert_eq!(history.len(), 2);
    assert_eq!(history.list()[0].image.as_deref(), Some(preview.as_str()));
    assert_eq!(history.list()[0].kind(), Endpoint::ParticleCount);
    assert_eq!(history.list()[1].date, "earlier");
    assert_eq!(history.backend().stored().len(), 2);
}

#[test]
fn delete_keeps_remaining_order_and_persists() {
    let mut history = HistoryStore::open(MemoryBackend::new());
    for date in ["d", "c", "b", "a"] {
        history.append(HistoryEntry::new(
            None,
            parse_response(Endpoint::ParticleCount, PARTICLE_BODY).unwrap(),
            date,
        ));
    }

    let removed = history.remove(1).unwrap();
    assert_eq!(removed.date, "b");
    let dates: Vec<_> = history.list().iter().map(|e| e.date.as_str()).collect();
    assert_eq!(dates, ["a", "c", "d"]);

    let stored: Vec<_> = history
        .backend()
        .stored()
        .into_iter()
        .map(|e| e.date)
        .collect();
    assert_eq!(stored, ["a", "c", "d"]);
}

#[test]
fn fetch_failure_can_be_retried() {
    let mut flow = UploadWorkflow::new(BASE);
    let selected = flow.select((), jpeg(100)).unwrap();
    flow.attach_preview(selected, "data:image/jpeg;base64,/9j/4A==".into());
    let ticket = flow.begin().unwrap();
    flow.fail(ticket, &ApiError::Network("TypeError: Failed to fetch".into()));

    let WorkflowState::Failed { message, .. } = flow.state() else {
        panic!("expected failure, got {:?}", flow.state());
    };
    assert_eq!(
        message,
        "Cannot connect to server. Please make sure the backend is running on http://localhost:8000"
    );

    let retry = flow.retry().unwrap();
    assert_eq!(flow.progress(), Some(0));
    flow.complete(
        retry,
        parse_response(Endpoint::ParticleCount, PARTICLE_BODY).unwrap(),
    );
    assert_eq!(flow.state(), &WorkflowState::Completed);
}

#[test]
fn http_errors_surface_server_detail() {
    let mut flow = UploadWorkflow::new(BASE);
    let selected = flow.select((), jpeg(100)).unwrap();
    flow.attach_preview(selected, "data:image/jpeg;base64,/9j/4A==".into());
    let ticket = flow.begin().unwrap();
    flow.fail(
        ticket,
        &ApiError::from_status(422, r#"{"detail":"Invalid image"}"#),
    );
    assert_eq!(
        flow.state(),
        &WorkflowState::Failed {
            message: "Invalid image".into(),
            remediation: &[],
        }
    );
}

#[test]
fn empty_strength_form_is_sent_as_zeros() {
    let form = StrengthForm::new();
    let body = serde_json::to_value(form.to_input()).unwrap();
    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 14);
    assert!(fields.values().all(|v| v.as_f64() == Some(0.0)));
    assert_eq!(form.to_input(), StrengthInput::default());
}

#[test]
fn strength_example_renders_five_cards() {
    let PredictionResult::StrengthPrediction(response) =
        parse_response(Endpoint::StrengthPrediction, STRENGTH_BODY).unwrap()
    else {
        panic!("wrong variant");
    };
    let rendered: Vec<String> = strength_cards(&response.predictions)
        .iter()
        .map(|card| card.strength.to_string())
        .collect();
    assert_eq!(
        rendered,
        ["5.00 MPa", "8.00 MPa", "18.00 MPa", "32.00 MPa", "38.00 MPa"]
    );
    assert_eq!(response.engineered_features_count, 22);
}

#[test]
fn history_filter_by_kind() {
    let mut history = HistoryStore::open(MemoryBackend::new());
    history.append(HistoryEntry::new(
        None,
        parse_response(Endpoint::StrengthPrediction, STRENGTH_BODY).unwrap(),
        "a",
    ));
    history.append(HistoryEntry::new(
        None,
        parse_response(Endpoint::ParticleCount, PARTICLE_BODY).unwrap(),
        "b",
    ));

    let strength_only = HistoryFilter {
        kind: Some(Endpoint::StrengthPrediction),
        search: String::new(),
    };
    let hits: Vec<_> = strength_only.select(history.list()).map(|(i, _)| i).collect();
    assert_eq!(hits, [1]);

    let summary = history.summary();
    assert_eq!(summary.average_strength_28d, Some(32.0));
    assert_eq!(summary.particles_counted, 50);
}

#[test]
fn bundled_config_resolves_every_endpoint() {
    let config = EndpointConfig::load().unwrap();
    assert!(config.url(Endpoint::ClinkerPhase).ends_with("/api/chamudini/predict"));
    assert!(config
        .fallback_url(Endpoint::ClinkerPhase)
        .is_some_and(|url| url.ends_with("/api/predict")));
    assert!(config.url(Endpoint::StrengthPrediction).ends_with("/api/hirumi/predict"));
    assert!(config.crack_url(0.35).ends_with("/api/sanchitha/predict?threshold=0.35"));
}
