//! End-to-end wizard flows over the file-backed store.
//!
//! Each test works in its own temporary state directory, so they can run in
//! parallel without sharing saved assessments.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rcsa_wizard::assessment::{AssessmentState, ResponseStrategy};
use rcsa_wizard::notifications::{Notifier, Severity};
use rcsa_wizard::store::{AssessmentStore, FileStorage, DEFAULT_STORAGE_KEY};
use rcsa_wizard::wizard::{Step, StepHooks, Transition, WizardSession};
use tempfile::TempDir;

// ─── Helpers ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Recorder {
    messages: Mutex<Vec<(String, Severity)>>,
}

impl Recorder {
    fn contains(&self, text: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|(m, _)| m == text)
    }
}

impl Notifier for Recorder {
    fn notify(&self, message: &str, severity: Severity) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity));
    }
}

fn open_session(dir: &TempDir, recorder: &Arc<Recorder>) -> WizardSession {
    let notifier: Arc<dyn Notifier> = recorder.clone();
    let store = AssessmentStore::new(
        Box::new(FileStorage::new(dir.path())),
        DEFAULT_STORAGE_KEY,
        notifier.clone(),
    );
    WizardSession::open(
        store,
        StepHooks::demo(),
        notifier,
        AssessmentState::for_process("Wire Transfer Assessment", "December 2024"),
    )
    .with_analysis_delay(Duration::ZERO)
}

async fn walk_to_review(session: &WizardSession) {
    session
        .edit(|form| {
            form.select_all_pre_identified();
        })
        .await;
    for _ in 1..Step::last().number() {
        assert!(matches!(session.advance().await, Transition::Moved { .. }));
    }
    assert_eq!(session.current_step().await, Step::ReviewSubmit);
}

// ─── Resume ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_reopened_session_resumes_where_it_left_off() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());

    {
        let session = open_session(&dir, &recorder);
        session.edit(|form| form.toggle_risk("system-failure")).await;
        session.advance().await;
        session.advance().await;
        assert_eq!(session.current_step().await, Step::ControlMapping);
    }

    let reopened = open_session(&dir, &recorder);
    let view = reopened.view().await;
    assert_eq!(view.step, Step::ControlMapping);
    assert!(view.form.is_selected("system-failure"));
    assert!(view.state.risk_assessments.contains_key("system-failure"));
}

#[tokio::test]
async fn test_corrupt_saved_file_starts_from_defaults() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json")),
        "{ not json",
    )
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder);
    assert_eq!(session.current_step().await, Step::RiskReview);
    let view = session.view().await;
    assert!(view.state.risk_assessments.is_empty());
    assert!(!view.state.is_submitted());
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_walk_submits_and_persists() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder);

    walk_to_review(&session).await;
    assert_eq!(session.advance().await, Transition::Submitted);
    assert!(recorder.contains("Assessment completed successfully!"));

    let stored = session.store().try_load().unwrap().unwrap();
    assert!(stored.is_submitted());
    assert_eq!(stored.metadata.current_step, Step::ReviewSubmit.number());
    assert!(!stored.residual_risk.is_empty());
    assert!(stored
        .risk_response
        .values()
        .all(|plan| plan.strategy != ResponseStrategy::Transfer));
}

// ─── Export / import ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_export_then_import_into_another_workspace() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();
    let exports = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());

    let source = open_session(&source_dir, &recorder);
    source.edit(|form| form.toggle_risk("sanctions-screening")).await;
    source.advance().await;
    let exported = source.export(exports.path()).await.unwrap();
    assert!(exported.exists());
    assert!(recorder.contains("Assessment data exported"));

    let target = open_session(&target_dir, &recorder);
    assert!(target.import(&exported).await);
    let view = target.view().await;
    assert_eq!(view.step, Step::InherentRisk);
    assert!(view.state.selected_risks.contains("sanctions-screening"));
    assert!(target.store().has_stored());
}

#[tokio::test]
async fn test_importing_garbage_keeps_current_assessment() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder);
    session.edit(|form| form.toggle_risk("system-failure")).await;
    session.advance().await;

    let bogus = dir.path().join("bogus.json");
    std::fs::write(&bogus, "not an assessment").unwrap();
    assert!(!session.import(&bogus).await);

    assert_eq!(session.current_step().await, Step::InherentRisk);
    let stored = session.store().try_load().unwrap().unwrap();
    assert!(stored.selected_risks.contains("system-failure"));
}

// ─── Clear ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_clear_removes_saved_file() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder);
    session.save_draft().await;
    assert!(session.store().has_stored());

    assert!(session.clear().await);
    assert!(!session.store().has_stored());
    assert_eq!(session.current_step().await, Step::RiskReview);
    assert!(recorder.contains("Data cleared successfully"));
}

// ─── Overlapping operations ──────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_clear_during_analysis_keeps_the_step_change() {
    let dir = TempDir::new().unwrap();
    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder).with_analysis_delay(Duration::from_secs(2));
    session.edit(|form| form.toggle_risk("system-failure")).await;
    session.advance().await;

    let (advanced, cleared) = tokio::join!(session.advance(), session.clear());
    assert_eq!(advanced.moved_to(), Some(Step::ControlMapping));
    assert!(!cleared);

    let stored = session.store().try_load().unwrap().unwrap();
    assert_eq!(stored.metadata.current_step, Step::ControlMapping.number());
    assert_eq!(session.current_step().await, Step::ControlMapping);
}

// ─── Out-of-scale documents ──────────────────────────────────────────────────

#[tokio::test]
async fn test_saved_file_with_oversized_rating_opens_clamped() {
    let dir = TempDir::new().unwrap();
    let mut doc = serde_json::to_value(AssessmentState::default()).unwrap();
    doc["riskAssessments"]["system-failure"] =
        serde_json::json!({ "likelihood": 16, "impact": 16 });
    doc["metadata"]["currentStep"] = serde_json::json!(5);
    std::fs::write(
        dir.path().join(format!("{DEFAULT_STORAGE_KEY}.json")),
        doc.to_string(),
    )
    .unwrap();

    let recorder = Arc::new(Recorder::default());
    let session = open_session(&dir, &recorder);
    let view = session.view().await;
    assert_eq!(view.step, Step::ResidualRisk);
    assert_eq!(view.state.risk_assessments["system-failure"].score(), 25);
    assert_eq!(view.form.residual_risk["system-failure"].inherent_score, 25);
}
