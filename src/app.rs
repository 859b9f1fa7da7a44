use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use rcsa_wizard::config::Config;
use rcsa_wizard::notifications::{NoticeSchedule, Notifier, Severity, ToastCenter};
use rcsa_wizard::store::{AutoSaver, AutosaveTarget};
use rcsa_wizard::wizard::{Step, Transition, WizardSession, WizardView};

use crate::ui::terminal_guard::{install_panic_hook, TerminalGuard};
use crate::ui::toasts::render_toasts;
use crate::ui::wizard::{apply, rows, Row, RowAction};
use crate::ui::{ConfirmDialog, ConfirmSelection, HelpDialog, ImportDialog, ImportResult, WizardScreen};

const WELCOME_MESSAGE: &str = "Welcome to the RCSA Assessment Wizard";
const ENCOURAGEMENT_MESSAGE: &str =
    "Great start! AI has already pre-selected common risks for wire transfers.";
const CLEAR_MESSAGE: &str =
    "This removes the saved assessment and starts over at step 1.\n\nClear all saved data?";

pub struct App {
    config: Config,
    session: Arc<WizardSession>,
    toasts: Arc<ToastCenter>,
    notices: NoticeSchedule,
    autosaver: AutoSaver,
    screen: WizardScreen,
    help_dialog: HelpDialog,
    exit_dialog: ConfirmDialog,
    clear_dialog: ConfirmDialog,
    import_dialog: ImportDialog,
    /// Advance/retreat calls running off the UI loop
    pending: Vec<JoinHandle<Transition>>,
    should_quit: bool,
}

impl App {
    pub fn new(config: Config) -> Result<Self> {
        let toasts = Arc::new(ToastCenter::new(
            config.toast_duration(),
            config.error_toast_duration(),
        ));
        let notifier: Arc<dyn Notifier> = toasts.clone();
        let session = Arc::new(WizardSession::from_config(&config, notifier));

        let mut notices = NoticeSchedule::new();
        notices.schedule(
            Duration::from_millis(config.ui.welcome_delay_ms),
            WELCOME_MESSAGE,
            Severity::Info,
            None,
        );
        notices.schedule(
            Duration::from_secs(config.ui.encouragement_delay_secs),
            ENCOURAGEMENT_MESSAGE,
            Severity::Success,
            Some(Step::RiskReview.number()),
        );

        let mut autosaver = AutoSaver::new(config.autosave.interval());
        if config.autosave.enabled {
            let target: Arc<dyn AutosaveTarget> = session.clone();
            autosaver.start(target);
        }

        tracing::info!(
            process = %config.process.name,
            period = %config.process.period,
            autosave = config.autosave.enabled,
            "Wizard opened"
        );

        Ok(Self {
            config,
            session,
            toasts,
            notices,
            autosaver,
            screen: WizardScreen::new(),
            help_dialog: HelpDialog::new(),
            exit_dialog: ConfirmDialog::new("Exit Assessment"),
            clear_dialog: ConfirmDialog::new("Clear Saved Data"),
            import_dialog: ImportDialog::new(),
            pending: Vec::new(),
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        install_panic_hook();
        let guard = TerminalGuard::new()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(self.config.ui.refresh_rate_ms);

        while !self.should_quit {
            self.collect_finished().await;

            let view = self.session.view().await;
            self.screen
                .sync(view.step, rows(view.step, &view.form).len());
            self.deliver_notices(view.step);

            let save_status = self.session.store().save_status();
            let navigating = self.session.is_navigating();
            let active_toasts = self.toasts.active();

            // A failed frame is logged and the next tick redraws
            if let Err(e) = terminal.draw(|f| {
                self.screen
                    .render(f, &view, &self.config.process, &save_status, navigating);
                render_toasts(f, &active_toasts);
                self.help_dialog.render(f);
                self.import_dialog.render(f);
                self.clear_dialog.render(f);
                self.exit_dialog.render(f);
            }) {
                tracing::warn!(error = %e, "Failed to draw frame");
            }

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key, &view).await;
                    }
                }
            }
        }

        self.shutdown().await;
        guard.restore();
        terminal.show_cursor()?;
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.autosaver.stop();
        for handle in self.pending.drain(..) {
            let _ = handle.await;
        }
        if !self.session.save_progress().await {
            tracing::warn!("Final save failed");
        }
        tracing::info!(minutes = self.session.minutes_open(), "Wizard closed");
    }

    fn deliver_notices(&mut self, step: Step) {
        for notice in self.notices.take_due(Instant::now(), step.number()) {
            self.toasts.push(&notice.message, notice.severity);
        }
    }

    /// Reap navigation tasks that have completed
    async fn collect_finished(&mut self) {
        let (done, running): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|h| h.is_finished());
        self.pending = running;

        for handle in done {
            match handle.await {
                Ok(transition) => {
                    tracing::debug!(?transition, "Navigation finished");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Navigation task failed");
                    self.toasts.push("Navigation failed", Severity::Error);
                }
            }
        }
    }

    fn spawn_advance(&mut self) {
        let session = self.session.clone();
        self.pending
            .push(tokio::spawn(async move { session.advance().await }));
    }

    fn spawn_retreat(&mut self) {
        let session = self.session.clone();
        self.pending
            .push(tokio::spawn(async move { session.retreat().await }));
    }

    async fn handle_key(&mut self, key: KeyEvent, view: &WizardView) {
        // Dialogs take priority, most recent on top
        if self.exit_dialog.visible {
            match confirm_key(&mut self.exit_dialog, key.code) {
                Some(ConfirmSelection::Yes) => self.should_quit = true,
                Some(ConfirmSelection::No) | None => {}
            }
            return;
        }

        if self.clear_dialog.visible {
            if confirm_key(&mut self.clear_dialog, key.code) == Some(ConfirmSelection::Yes) {
                self.session.clear().await;
            }
            return;
        }

        if self.import_dialog.visible {
            match self.import_dialog.handle_key(key.code) {
                ImportResult::Submit(path) => self.import(path).await,
                ImportResult::Cancel | ImportResult::Pending => {}
            }
            return;
        }

        if self.help_dialog.visible {
            match key.code {
                KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.help_dialog.hide();
                }
                _ => {}
            }
            return;
        }

        // Alt+1..7 jumps along the progress bar
        if key.modifiers.contains(KeyModifiers::ALT) {
            if let KeyCode::Char(c) = key.code {
                if let Some(number) = c.to_digit(10) {
                    self.session.jump_to(number as u8).await;
                }
            }
            return;
        }

        let step = view.step;
        let row_count = rows(step, &view.form).len();

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc => {
                if self.screen.focused_crumb().is_some() {
                    self.screen.clear_crumb_focus();
                } else {
                    self.exit_dialog
                        .show(ConfirmDialog::exit_message(self.session.minutes_open()));
                }
            }
            KeyCode::F(1) | KeyCode::Char('?') => {
                self.help_dialog.toggle_for(step);
            }
            KeyCode::Char('d') => {
                self.toasts.dismiss_latest();
            }

            // Navigation
            KeyCode::Enter | KeyCode::Right => self.spawn_advance(),
            KeyCode::Left | KeyCode::Backspace => self.spawn_retreat(),
            KeyCode::Tab => self.screen.focus_next_crumb(),
            KeyCode::BackTab => self.screen.focus_prev_crumb(),
            KeyCode::Char('g') => {
                if let Some(target) = self.screen.focused_crumb() {
                    self.session.jump_to(target.number()).await;
                    self.screen.clear_crumb_focus();
                }
            }
            KeyCode::Char('j') | KeyCode::Down => self.screen.cursor_down(row_count),
            KeyCode::Char('k') | KeyCode::Up => self.screen.cursor_up(),

            // Data
            KeyCode::Char('s') => {
                self.session.save_draft().await;
            }
            KeyCode::Char('e') => {
                if let Some(path) = self.session.export(&self.config.exports_path()).await {
                    tracing::info!(path = %path.display(), "Exported from wizard");
                }
            }
            KeyCode::Char('o') => {
                let suggestion = format!("{}/", self.config.exports_path().display());
                self.import_dialog.show(suggestion);
            }
            KeyCode::Char('x') => {
                self.clear_dialog.show(CLEAR_MESSAGE);
            }

            // Risk review
            KeyCode::Char('a') if step == Step::RiskReview => {
                self.session
                    .edit(|form| form.select_all_pre_identified())
                    .await;
                self.toasts
                    .push("All pre-identified risks selected", Severity::Success);
            }
            KeyCode::Char('c') if step == Step::RiskReview => {
                self.session.edit(|form| form.clear_selection()).await;
                self.toasts.push("Risk selection cleared", Severity::Info);
            }
            KeyCode::Char('f') if step == Step::RiskReview => {
                self.session
                    .edit(|form| form.toggle_operational_filter())
                    .await;
            }

            // Row edits
            KeyCode::Char(' ') => self.edit_row(step, view, RowAction::Toggle).await,
            KeyCode::Char('l') if step == Step::InherentRisk => {
                self.edit_row(step, view, RowAction::CycleLikelihood).await
            }
            KeyCode::Char('i') if step == Step::InherentRisk => {
                self.edit_row(step, view, RowAction::CycleImpact).await
            }
            _ => {}
        }
    }

    async fn edit_row(&mut self, step: Step, view: &WizardView, action: RowAction) {
        let busy = !self.pending.is_empty() || self.session.is_navigating();
        let current = self.session.current_step().await;
        if !row_edit_allowed(step, current, busy) {
            tracing::debug!(
                drawn = step.number(),
                current = current.number(),
                "Ignoring row edit during step change"
            );
            return;
        }
        let Some(row): Option<Row> = self.screen.selected_row(step, &view.form) else {
            return;
        };
        self.session
            .edit(|form| apply(form, step, &row, action))
            .await;
    }

    async fn import(&mut self, path: PathBuf) {
        if self.session.import(&path).await {
            tracing::info!(path = %path.display(), "Imported from wizard");
        }
    }
}

/// Rows are picked from the drawn frame, so an edit only applies while that
/// frame's step is still current and no step change is queued or running
fn row_edit_allowed(drawn: Step, current: Step, busy: bool) -> bool {
    !busy && drawn == current
}

/// Shared key handling for yes/no dialogs; returns the choice once made
fn confirm_key(dialog: &mut ConfirmDialog, key: KeyCode) -> Option<ConfirmSelection> {
    match key {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            dialog.hide();
            Some(ConfirmSelection::Yes)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            dialog.hide();
            Some(ConfirmSelection::No)
        }
        KeyCode::Enter => {
            dialog.hide();
            Some(dialog.selection)
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            dialog.toggle_selection();
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_key_yes_and_no() {
        let mut dialog = ConfirmDialog::new("Exit Assessment");
        dialog.show("sure?");
        assert_eq!(
            confirm_key(&mut dialog, KeyCode::Char('y')),
            Some(ConfirmSelection::Yes)
        );
        assert!(!dialog.visible);

        dialog.show("sure?");
        assert_eq!(
            confirm_key(&mut dialog, KeyCode::Esc),
            Some(ConfirmSelection::No)
        );
    }

    #[test]
    fn test_row_edit_waits_for_step_change() {
        assert!(row_edit_allowed(Step::InherentRisk, Step::InherentRisk, false));
        assert!(!row_edit_allowed(Step::InherentRisk, Step::InherentRisk, true));
        assert!(!row_edit_allowed(Step::InherentRisk, Step::ControlMapping, false));
    }

    #[test]
    fn test_confirm_enter_uses_selection() {
        let mut dialog = ConfirmDialog::new("Clear Saved Data");
        dialog.show(CLEAR_MESSAGE);
        assert_eq!(confirm_key(&mut dialog, KeyCode::Enter), Some(ConfirmSelection::No));

        dialog.show(CLEAR_MESSAGE);
        assert_eq!(confirm_key(&mut dialog, KeyCode::Right), None);
        assert_eq!(
            confirm_key(&mut dialog, KeyCode::Enter),
            Some(ConfirmSelection::Yes)
        );
    }
}
