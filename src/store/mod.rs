//! Persistence for the assessment aggregate.
//!
//! The whole [`AssessmentState`] is stored as one pretty-printed JSON document
//! under a fixed key. Public operations never fail outward: read and parse
//! errors degrade to defaults, write errors come back as `false`, and every
//! failure is logged and surfaced through the [`Notifier`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, NaiveDate};
use thiserror::Error;

use crate::assessment::AssessmentState;
use crate::config::Config;
use crate::notifications::{Notifier, Severity};
use crate::wizard::{FormDraft, Step};

mod autosave;
mod backend;

pub use autosave::{AutoSaver, AutosaveTarget, DEFAULT_AUTOSAVE_INTERVAL};
pub use backend::{FileStorage, MemoryStorage, StorageBackend};

/// Key the assessment is stored under unless configured otherwise
pub const DEFAULT_STORAGE_KEY: &str = "rcsaAssessmentData";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid assessment document: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("failed to serialize assessment: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Serialize an assessment the way it is stored and exported
pub fn to_document(state: &AssessmentState) -> Result<String, StoreError> {
    serde_json::to_string_pretty(&state.clone().normalized()).map_err(StoreError::Serialize)
}

/// Parse a stored or imported document, repairing invariants
pub fn from_document(text: &str) -> Result<AssessmentState, StoreError> {
    let state: AssessmentState = serde_json::from_str(text).map_err(StoreError::Parse)?;
    Ok(state.normalized())
}

/// File name used for exports made on the given day
pub fn export_file_name(date: NaiveDate) -> String {
    format!("rcsa-assessment-{}.json", date.format("%Y-%m-%d"))
}

/// Copy the form values collected on `step` into the matching field of `state`.
///
/// The review step has nothing to collect.
pub fn snapshot_current_step(state: &mut AssessmentState, step: Step, form: &FormDraft) {
    match step {
        Step::RiskReview => state.selected_risks = form.selection_or_seed(),
        Step::InherentRisk => state.risk_assessments = form.risk_assessments.clone(),
        Step::ControlMapping => state.control_mappings = form.control_mappings.clone(),
        Step::ControlEffectiveness => {
            state.control_effectiveness = form.control_effectiveness.clone();
        }
        Step::ResidualRisk => state.residual_risk = form.residual_risk.clone(),
        Step::RiskResponse => state.risk_response = form.risk_response.clone(),
        Step::ReviewSubmit => {}
    }
    state.touch();
}

pub struct AssessmentStore {
    backend: Box<dyn StorageBackend>,
    key: String,
    last_saved: Mutex<Option<DateTime<Local>>>,
    notifier: Arc<dyn Notifier>,
}

impl AssessmentStore {
    pub fn new(
        backend: Box<dyn StorageBackend>,
        key: impl Into<String>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            backend,
            key: key.into(),
            last_saved: Mutex::new(None),
            notifier,
        }
    }

    /// File-backed store in the configured state directory
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        Self::new(
            Box::new(FileStorage::new(config.state_path())),
            config.storage.key.clone(),
            notifier,
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Raw stored document, if any
    pub fn stored_document(&self) -> Option<String> {
        match self.backend.get(&self.key) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to read stored assessment");
                None
            }
        }
    }

    pub fn has_stored(&self) -> bool {
        self.stored_document().is_some()
    }

    /// Stored assessment, `Ok(None)` when nothing has been saved yet
    pub fn try_load(&self) -> Result<Option<AssessmentState>, StoreError> {
        match self.backend.get(&self.key)? {
            Some(text) => from_document(&text).map(Some),
            None => Ok(None),
        }
    }

    /// Stored assessment or defaults; never fails
    pub fn load(&self) -> AssessmentState {
        match self.try_load() {
            Ok(Some(state)) => {
                tracing::debug!(
                    key = %self.key,
                    step = state.metadata.current_step,
                    risks = state.selected_risks.len(),
                    "Assessment loaded"
                );
                state
            }
            Ok(None) => AssessmentState::default(),
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Falling back to default assessment");
                AssessmentState::default()
            }
        }
    }

    fn write(&self, state: &AssessmentState) -> Result<(), StoreError> {
        let doc = to_document(state)?;
        self.backend.set(&self.key, &doc)?;
        *self.last_saved_lock() = Some(Local::now());
        Ok(())
    }

    /// Persist the whole aggregate, returning whether it was written
    pub fn save(&self, state: &AssessmentState) -> bool {
        match self.write(state) {
            Ok(()) => {
                tracing::debug!(
                    key = %self.key,
                    step = state.metadata.current_step,
                    "Assessment saved"
                );
                true
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to save assessment");
                self.notifier.notify("Failed to save data", Severity::Error);
                false
            }
        }
    }

    /// Remove the stored assessment and reset the last-saved marker
    pub fn clear(&self) -> bool {
        match self.backend.remove(&self.key) {
            Ok(()) => {
                *self.last_saved_lock() = None;
                tracing::info!(key = %self.key, "Assessment data cleared");
                self.notifier
                    .notify("Data cleared successfully", Severity::Info);
                true
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to clear assessment");
                self.notifier.notify("Failed to clear data", Severity::Error);
                false
            }
        }
    }

    pub fn last_saved(&self) -> Option<DateTime<Local>> {
        *self.last_saved_lock()
    }

    /// Status line text for the last save
    pub fn save_status(&self) -> String {
        match self.last_saved() {
            Some(at) => format!("Last saved: {}", at.format("%H:%M:%S")),
            None => "Not saved yet".to_string(),
        }
    }

    /// Write `state` as a dated JSON file into `dir`
    pub fn export_as_file(&self, state: &AssessmentState, dir: &Path) -> Option<PathBuf> {
        let path = dir.join(export_file_name(Local::now().date_naive()));
        let result = to_document(state).and_then(|doc| {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            fs::write(&path, doc).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })
        });

        match result {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Assessment exported");
                self.notifier
                    .notify("Assessment data exported", Severity::Success);
                Some(path)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to export assessment");
                self.notifier.notify("Failed to export data", Severity::Error);
                None
            }
        }
    }

    /// Replace the stored assessment with the contents of `path`.
    ///
    /// A file that cannot be read or parsed leaves the stored state untouched.
    pub fn import_from_file(&self, path: &Path) -> Result<AssessmentState, StoreError> {
        let result = fs::read_to_string(path)
            .map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
            .and_then(|text| from_document(&text))
            .and_then(|state| self.write(&state).map(|()| state));

        match &result {
            Ok(state) => {
                tracing::info!(
                    path = %path.display(),
                    step = state.metadata.current_step,
                    "Assessment imported"
                );
                self.notifier
                    .notify("Assessment data imported successfully", Severity::Success);
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to import assessment");
                self.notifier.notify(
                    "Failed to import data - invalid file format",
                    Severity::Error,
                );
            }
        }
        result
    }

    fn last_saved_lock(&self) -> std::sync::MutexGuard<'_, Option<DateTime<Local>>> {
        self.last_saved
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::{InherentRating, SEED_RISK};
    use crate::notifications::ToastCenter;
    use tempfile::TempDir;

    fn memory_store() -> (AssessmentStore, Arc<ToastCenter>) {
        let toasts = Arc::new(ToastCenter::default());
        let store = AssessmentStore::new(
            Box::new(MemoryStorage::new()),
            DEFAULT_STORAGE_KEY,
            toasts.clone(),
        );
        (store, toasts)
    }

    fn sample_state() -> AssessmentState {
        let mut state = AssessmentState::default();
        state.selected_risks.insert("sanctions-screening".to_string());
        state
            .risk_assessments
            .insert(SEED_RISK.to_string(), InherentRating::new(3, 4));
        state.metadata.current_step = 3;
        state
    }

    #[test]
    fn test_load_without_stored_blob_returns_defaults() {
        let (store, _) = memory_store();
        let state = store.load();
        assert!(state.selected_risks.contains(SEED_RISK));
        assert_eq!(state.metadata.current_step, 1);
        assert!(!store.has_stored());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (store, _) = memory_store();
        let state = sample_state();
        assert!(store.save(&state));
        assert_eq!(store.load(), state);
    }

    #[test]
    fn test_empty_selection_persists_as_seed() {
        let (store, _) = memory_store();
        let mut state = sample_state();
        state.selected_risks.clear();
        assert!(store.save(&state));

        let loaded = store.load();
        assert_eq!(loaded.selected_risks.len(), 1);
        assert!(loaded.selected_risks.contains(SEED_RISK));
    }

    #[test]
    fn test_corrupt_blob_degrades_to_defaults() {
        let backend = MemoryStorage::new();
        backend.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = AssessmentStore::new(
            Box::new(backend),
            DEFAULT_STORAGE_KEY,
            Arc::new(ToastCenter::default()),
        );

        assert!(store.try_load().is_err());
        assert_eq!(store.load().metadata.current_step, 1);
    }

    #[test]
    fn test_save_status_tracks_last_save_and_clear() {
        let (store, toasts) = memory_store();
        assert_eq!(store.save_status(), "Not saved yet");

        store.save(&sample_state());
        assert!(store.save_status().starts_with("Last saved: "));

        assert!(store.clear());
        assert_eq!(store.save_status(), "Not saved yet");
        assert!(!store.has_stored());
        assert_eq!(toasts.active()[0].message, "Data cleared successfully");
    }

    #[test]
    fn test_failed_save_returns_false_and_notifies() {
        let backend = MemoryStorage::new();
        backend.set_read_only(true);
        let toasts = Arc::new(ToastCenter::default());
        let store = AssessmentStore::new(Box::new(backend), DEFAULT_STORAGE_KEY, toasts.clone());

        assert!(!store.save(&sample_state()));
        assert_eq!(store.last_saved(), None);
        let active = toasts.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].severity, Severity::Error);
    }

    #[test]
    fn test_export_matches_stored_document() {
        let temp_dir = TempDir::new().unwrap();
        let (store, _) = memory_store();
        let state = sample_state();
        store.save(&state);

        let path = store.export_as_file(&state, temp_dir.path()).unwrap();
        let file_name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file_name.starts_with("rcsa-assessment-"));
        assert!(file_name.ends_with(".json"));

        let exported = fs::read_to_string(&path).unwrap();
        assert_eq!(Some(exported), store.stored_document());
    }

    #[test]
    fn test_import_malformed_leaves_state_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let (store, toasts) = memory_store();
        let state = sample_state();
        store.save(&state);
        let before = store.stored_document();

        let bad = temp_dir.path().join("bad.json");
        fs::write(&bad, "{\"selectedRisks\": [").unwrap();

        assert!(store.import_from_file(&bad).is_err());
        assert_eq!(store.stored_document(), before);
        let active = toasts.active();
        assert_eq!(
            active.last().unwrap().message,
            "Failed to import data - invalid file format"
        );
    }

    #[test]
    fn test_import_replaces_stored_state() {
        let temp_dir = TempDir::new().unwrap();
        let (store, _) = memory_store();
        store.save(&AssessmentState::default());

        let incoming = sample_state();
        let path = temp_dir.path().join("incoming.json");
        fs::write(&path, to_document(&incoming).unwrap()).unwrap();

        let imported = store.import_from_file(&path).unwrap();
        assert_eq!(imported, incoming);
        assert_eq!(store.load(), incoming);
    }

    #[test]
    fn test_export_file_name_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 2).unwrap();
        assert_eq!(export_file_name(date), "rcsa-assessment-2024-12-02.json");
    }

    #[test]
    fn test_snapshot_maps_step_to_field() {
        let mut state = AssessmentState::default();
        let mut form = FormDraft::default();
        form.selected_risks.insert("unauthorized-transfer".to_string());
        form.risk_assessments
            .insert("unauthorized-transfer".to_string(), InherentRating::new(3, 5));

        snapshot_current_step(&mut state, Step::RiskReview, &form);
        assert_eq!(state.selected_risks, form.selected_risks);
        assert!(state.risk_assessments.is_empty());

        snapshot_current_step(&mut state, Step::InherentRisk, &form);
        assert_eq!(state.risk_assessments, form.risk_assessments);

        let before = state.clone();
        snapshot_current_step(&mut state, Step::ReviewSubmit, &form);
        assert_eq!(state.selected_risks, before.selected_risks);
        assert_eq!(state.risk_assessments, before.risk_assessments);
    }

    #[test]
    fn test_snapshot_empty_selection_falls_back_to_seed() {
        let mut state = AssessmentState::default();
        state.selected_risks.insert("sanctions-screening".to_string());
        snapshot_current_step(&mut state, Step::RiskReview, &FormDraft::default());
        assert_eq!(state.selected_risks.len(), 1);
        assert!(state.selected_risks.contains(SEED_RISK));
    }
}
