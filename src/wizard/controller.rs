//! The wizard session: step cursor, transitions and persistence wiring.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::assessment::AssessmentState;
use crate::config::Config;
use crate::notifications::{Notifier, Severity};
use crate::store::{snapshot_current_step, AssessmentStore, AutosaveTarget};
use crate::wizard::{FormDraft, Step, StepContext, StepHooks, StepStatus};

/// Default pause for the simulated analysis between steps
pub const DEFAULT_ANALYSIS_DELAY: Duration = Duration::from_millis(2000);

/// Outcome of a navigation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Moved { from: Step, to: Step },
    /// Validation failed; the cursor stays on this step
    Blocked(Step),
    /// Another transition is in flight
    Busy,
    /// Nothing to do (first step, out of range, unreachable)
    Unchanged,
    Submitted,
}

impl Transition {
    pub fn moved_to(&self) -> Option<Step> {
        match self {
            Transition::Moved { to, .. } => Some(*to),
            _ => None,
        }
    }
}

/// Point-in-time copy of the session for rendering
#[derive(Debug, Clone)]
pub struct WizardView {
    pub step: Step,
    pub progress: Vec<(Step, StepStatus)>,
    pub state: AssessmentState,
    pub form: FormDraft,
    pub time_on_step: Duration,
}

struct SessionInner {
    step: Step,
    state: AssessmentState,
    form: FormDraft,
    step_entered_at: Instant,
}

/// Clears the navigation flag when a transition ends, however it ends.
struct NavigationGuard<'a>(&'a AtomicBool);

impl<'a> NavigationGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for NavigationGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One open assessment.
///
/// Owned by the host (the TUI app or a CLI command) and shared behind an `Arc`.
pub struct WizardSession {
    inner: RwLock<SessionInner>,
    navigating: AtomicBool,
    store: AssessmentStore,
    hooks: StepHooks,
    notifier: Arc<dyn Notifier>,
    analysis_delay: Duration,
    /// Used to reset the session after a clear
    fresh: AssessmentState,
    opened_at: Instant,
}

impl WizardSession {
    pub fn new(store: AssessmentStore, hooks: StepHooks, notifier: Arc<dyn Notifier>) -> Self {
        Self::open(store, hooks, notifier, AssessmentState::default())
    }

    /// Session over the configured state directory with the built-in hooks
    pub fn from_config(config: &Config, notifier: Arc<dyn Notifier>) -> Self {
        let store = AssessmentStore::from_config(config, notifier.clone());
        let fresh =
            AssessmentState::for_process(&config.process.name, &config.process.period);
        Self::open(store, StepHooks::demo(), notifier, fresh)
            .with_analysis_delay(Duration::from_millis(config.ui.analysis_delay_ms))
    }

    /// Resume the stored assessment, or start `fresh` with an empty form
    pub fn open(
        store: AssessmentStore,
        hooks: StepHooks,
        notifier: Arc<dyn Notifier>,
        fresh: AssessmentState,
    ) -> Self {
        let (state, form) = if store.has_stored() {
            let state = store.load();
            let form = FormDraft::from_state(&state);
            (state, form)
        } else {
            (fresh.clone(), FormDraft::default())
        };
        let step = Step::from_number(state.metadata.current_step).unwrap_or(Step::first());

        info!(
            process = %state.metadata.process_name,
            step = step.number(),
            resumed = store.has_stored(),
            "Assessment session opened"
        );

        let mut inner = SessionInner {
            step,
            state,
            form,
            step_entered_at: Instant::now(),
        };
        run_hook(&hooks, &mut inner, step);

        Self {
            inner: RwLock::new(inner),
            navigating: AtomicBool::new(false),
            store,
            hooks,
            notifier,
            analysis_delay: DEFAULT_ANALYSIS_DELAY,
            fresh,
            opened_at: Instant::now(),
        }
    }

    pub fn with_analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = delay;
        self
    }

    pub fn store(&self) -> &AssessmentStore {
        &self.store
    }

    pub fn is_navigating(&self) -> bool {
        self.navigating.load(Ordering::Acquire)
    }

    pub async fn current_step(&self) -> Step {
        self.inner.read().await.step
    }

    /// Whole minutes since the session was opened
    pub fn minutes_open(&self) -> u64 {
        self.opened_at.elapsed().as_secs() / 60
    }

    pub async fn view(&self) -> WizardView {
        let inner = self.inner.read().await;
        WizardView {
            step: inner.step,
            progress: Step::all()
                .iter()
                .map(|s| (*s, s.status(inner.step)))
                .collect(),
            state: inner.state.clone(),
            form: inner.form.clone(),
            time_on_step: inner.step_entered_at.elapsed(),
        }
    }

    /// Mutate the live form
    pub async fn edit<R>(&self, f: impl FnOnce(&mut FormDraft) -> R) -> R {
        let mut inner = self.inner.write().await;
        f(&mut inner.form)
    }

    /// Validate the current step, then move forward or submit at the last step.
    ///
    /// A call made while another transition is in flight returns `Busy` and
    /// changes nothing.
    pub async fn advance(&self) -> Transition {
        let Some(_guard) = NavigationGuard::acquire(&self.navigating) else {
            debug!("Navigation already in progress, ignoring advance");
            return Transition::Busy;
        };

        let current = {
            let inner = self.inner.read().await;
            if !inner.step.validate(&inner.form) {
                warn!(step = inner.step.number(), "Step validation failed");
                self.notifier
                    .notify(inner.step.validation_message(), Severity::Warning);
                return Transition::Blocked(inner.step);
            }
            inner.step
        };

        if current.runs_analysis() {
            self.simulate_analysis(current).await;
        }

        let Some(next) = current.next() else {
            return self.submit_locked().await;
        };

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        snapshot_current_step(&mut inner.state, current, &inner.form);
        inner.state.metadata.current_step = next.number();
        self.store.save(&inner.state);
        self.enter(inner, next);

        Transition::Moved {
            from: current,
            to: next,
        }
    }

    /// Snapshot, persist and step back. No validation; nothing happens on step 1.
    pub async fn retreat(&self) -> Transition {
        let Some(_guard) = NavigationGuard::acquire(&self.navigating) else {
            debug!("Navigation already in progress, ignoring retreat");
            return Transition::Busy;
        };

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let current = inner.step;
        let Some(prev) = current.prev() else {
            return Transition::Unchanged;
        };

        snapshot_current_step(&mut inner.state, current, &inner.form);
        inner.state.metadata.current_step = prev.number();
        self.store.save(&inner.state);
        self.enter(inner, prev);

        Transition::Moved {
            from: current,
            to: prev,
        }
    }

    /// Jump straight to `number`. Out-of-range numbers and calls during a
    /// transition are ignored.
    pub async fn go_to(&self, number: u8) -> Transition {
        let Some(target) = Step::from_number(number) else {
            debug!(step = number, "Ignoring jump to out-of-range step");
            return Transition::Unchanged;
        };
        let Some(_guard) = NavigationGuard::acquire(&self.navigating) else {
            debug!(step = number, "Navigation already in progress, ignoring jump");
            return Transition::Busy;
        };

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let current = inner.step;
        if target == current {
            return Transition::Unchanged;
        }

        snapshot_current_step(&mut inner.state, current, &inner.form);
        inner.state.metadata.current_step = target.number();
        self.enter(inner, target);

        Transition::Moved {
            from: current,
            to: target,
        }
    }

    /// Breadcrumb / shortcut jump: only completed steps, the current one, or the next one
    pub async fn jump_to(&self, number: u8) -> Transition {
        let current = self.current_step().await;
        match Step::from_number(number) {
            Some(target) if target.is_reachable_from(current) => self.go_to(number).await,
            _ => {
                debug!(
                    step = number,
                    current = current.number(),
                    "Step not reachable yet"
                );
                Transition::Unchanged
            }
        }
    }

    /// Snapshot the active step and persist the aggregate
    pub async fn save_progress(&self) -> bool {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        snapshot_current_step(&mut inner.state, inner.step, &inner.form);
        self.store.save(&inner.state)
    }

    /// Manual save with a confirmation notice
    pub async fn save_draft(&self) -> bool {
        let saved = self.save_progress().await;
        if saved {
            self.notifier
                .notify("Draft saved successfully", Severity::Success);
        }
        saved
    }

    /// Save, then write the export file into `dir`
    pub async fn export(&self, dir: &Path) -> Option<PathBuf> {
        let guard = self.inner.read().await;
        let mut state = guard.state.clone();
        snapshot_current_step(&mut state, guard.step, &guard.form);
        drop(guard);

        if !self.store.save(&state) {
            return None;
        }
        self.inner.write().await.state = state.clone();
        self.store.export_as_file(&state, dir)
    }

    /// Replace the assessment with an exported file and reload the view.
    ///
    /// Refused (returns false) while a step change is in flight.
    pub async fn import(&self, path: &Path) -> bool {
        let Some(_nav) = self.acquire_for("import") else {
            return false;
        };
        let Ok(state) = self.store.import_from_file(path) else {
            return false;
        };

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let step = Step::from_number(state.metadata.current_step).unwrap_or(Step::first());
        inner.form = FormDraft::from_state(&state);
        inner.state = state;
        inner.step = step;
        inner.step_entered_at = Instant::now();
        run_hook(&self.hooks, inner, step);
        true
    }

    /// Remove the stored assessment and start over on step 1; refused while a
    /// step change is in flight
    pub async fn clear(&self) -> bool {
        let Some(_nav) = self.acquire_for("clear") else {
            return false;
        };
        if !self.store.clear() {
            return false;
        }
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        inner.state = self.fresh.clone();
        inner.state.touch();
        inner.form = FormDraft::default();
        inner.step = Step::first();
        inner.step_entered_at = Instant::now();
        true
    }

    /// Guard for replacing the whole assessment; refused while a step change runs
    fn acquire_for(&self, action: &'static str) -> Option<NavigationGuard<'_>> {
        let guard = NavigationGuard::acquire(&self.navigating);
        if guard.is_none() {
            debug!(action, "Navigation in progress, refusing");
            self.notifier.notify(
                "Please wait for the current step to finish",
                Severity::Warning,
            );
        }
        guard
    }

    async fn simulate_analysis(&self, step: Step) {
        self.notifier
            .notify(step.analysis_message(), Severity::Info);
        tokio::time::sleep(self.analysis_delay).await;
        self.notifier
            .notify("AI analysis complete!", Severity::Success);
    }

    async fn submit_locked(&self) -> Transition {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if let Some(failed) = Step::all().iter().find(|s| !s.validate(&inner.form)) {
            warn!(step = failed.number(), "Submission blocked by validation");
            self.notifier
                .notify(failed.validation_message(), Severity::Warning);
            return Transition::Blocked(*failed);
        }

        for step in Step::all() {
            snapshot_current_step(&mut inner.state, *step, &inner.form);
        }
        let previous = inner.state.metadata.submitted_at.replace(Utc::now());

        if !self.store.save(&inner.state) {
            inner.state.metadata.submitted_at = previous;
            return Transition::Unchanged;
        }

        info!(
            process = %inner.state.metadata.process_name,
            risks = inner.state.selected_risks.len(),
            seconds_on_step = inner.step_entered_at.elapsed().as_secs(),
            "Assessment submitted"
        );
        self.notifier
            .notify("Assessment completed successfully!", Severity::Success);
        Transition::Submitted
    }

    fn enter(&self, inner: &mut SessionInner, target: Step) {
        info!(
            from = inner.step.number(),
            to = target.number(),
            seconds_on_step = inner.step_entered_at.elapsed().as_secs(),
            "Step transition"
        );
        inner.step = target;
        inner.step_entered_at = Instant::now();
        run_hook(&self.hooks, inner, target);
    }
}

fn run_hook(hooks: &StepHooks, inner: &mut SessionInner, step: Step) {
    let Some(hook) = hooks.get(step) else {
        return;
    };
    let ctx = StepContext {
        step,
        form: &mut inner.form,
        state: &inner.state,
    };
    if let Err(e) = hook.initialize(ctx) {
        warn!(
            step = step.number(),
            hook = hook.name(),
            error = %e,
            "Step initializer failed"
        );
    }
}

#[async_trait]
impl AutosaveTarget for WizardSession {
    async fn autosave(&self) -> bool {
        self.save_progress().await
    }
}
