//! The assessment wizard screen: header, progress breadcrumb, step pane, status bar.

mod panes;
mod rows;

use std::time::Duration;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use rcsa_wizard::config::ProcessConfig;
use rcsa_wizard::wizard::{FormDraft, Step, StepStatus, WizardView};

pub use rows::{apply, rows, Row, RowAction};

/// Cursor and breadcrumb focus for the wizard screen
pub struct WizardScreen {
    cursor: usize,
    /// Step the cursor belongs to; a step change resets it
    cursor_step: Step,
    focused_crumb: Option<Step>,
}

impl WizardScreen {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            cursor_step: Step::first(),
            focused_crumb: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bring the cursor in line with `step` and the number of rows it has
    pub fn sync(&mut self, step: Step, row_count: usize) {
        if step != self.cursor_step {
            self.cursor_step = step;
            self.cursor = 0;
            self.focused_crumb = None;
        }
        if row_count == 0 {
            self.cursor = 0;
        } else if self.cursor >= row_count {
            self.cursor = row_count - 1;
        }
    }

    pub fn cursor_down(&mut self, row_count: usize) {
        if row_count > 0 && self.cursor + 1 < row_count {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Row under the cursor for `step`
    pub fn selected_row(&self, step: Step, form: &FormDraft) -> Option<Row> {
        rows(step, form).into_iter().nth(self.cursor)
    }

    pub fn focused_crumb(&self) -> Option<Step> {
        self.focused_crumb
    }

    /// Tab: move breadcrumb focus right, wrapping
    pub fn focus_next_crumb(&mut self) {
        self.focused_crumb = Some(match self.focused_crumb {
            None => Step::first(),
            Some(step) => step.next().unwrap_or(Step::first()),
        });
    }

    /// Shift+Tab: move breadcrumb focus left, wrapping
    pub fn focus_prev_crumb(&mut self) {
        self.focused_crumb = Some(match self.focused_crumb {
            None => Step::last(),
            Some(step) => step.prev().unwrap_or(Step::last()),
        });
    }

    pub fn clear_crumb_focus(&mut self) {
        self.focused_crumb = None;
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        view: &WizardView,
        process: &ProcessConfig,
        save_status: &str,
        navigating: bool,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(2), // Breadcrumb
                Constraint::Min(8),    // Step pane
                Constraint::Length(2), // Status bar
            ])
            .split(frame.area());

        HeaderBar { process }.render(frame, chunks[0]);
        self.render_breadcrumb(frame, chunks[1], view);
        self.render_pane(frame, chunks[2], view);
        StatusBar {
            save_status,
            navigating,
            time_on_step: view.time_on_step,
        }
        .render(frame, chunks[3]);
    }

    fn render_breadcrumb(&self, frame: &mut Frame, area: Rect, view: &WizardView) {
        let mut spans = Vec::new();
        for (i, (step, status)) in view.progress.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            let (icon, mut style) = match status {
                StepStatus::Completed => ("✓", Style::default().fg(Color::Green)),
                StepStatus::Current => (
                    "●",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                StepStatus::Future => ("○", Style::default().fg(Color::DarkGray)),
            };
            if self.focused_crumb == Some(*step) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(
                format!("{icon} {} {}", step.number(), step.name()),
                style,
            ));
        }

        let mut lines = vec![Line::from(spans)];
        if let Some(step) = self.focused_crumb {
            lines.push(Line::from(Span::styled(
                format!("  {}", step.tooltip(view.step)),
                Style::default().fg(Color::Gray),
            )));
        }
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_pane(&self, frame: &mut Frame, area: Rect, view: &WizardView) {
        let rows = rows(view.step, &view.form);
        let lines = panes::pane_lines(view, &rows, self.cursor);

        // Keep the cursor row in view; panes only add a couple of lines per row
        let visible = area.height.saturating_sub(2) as usize;
        let scroll = (self.cursor + 4).saturating_sub(visible) as u16;

        let pane = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(
                Block::default()
                    .title(format!(" {} ", view.step))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            );
        frame.render_widget(pane, area);
    }
}

struct HeaderBar<'a> {
    process: &'a ProcessConfig,
}

impl HeaderBar<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let sep = || Span::styled("  │  ", Style::default().fg(Color::DarkGray));
        let field = |label: &str, value: &str| {
            vec![
                Span::styled(format!("{label}: "), Style::default().fg(Color::Gray)),
                Span::raw(value.to_string()),
            ]
        };

        let title = Line::from(vec![
            Span::styled(
                format!(" {}", self.process.name),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {}", self.process.period),
                Style::default().fg(Color::Gray),
            ),
        ]);

        let mut details = vec![Span::raw(" ")];
        details.extend(field("Business Unit", &self.process.business_unit));
        details.push(sep());
        details.extend(field("Due", &self.process.due));
        details.push(sep());
        details.extend(field("Last Assessed", &self.process.last_assessed));
        details.push(sep());
        details.extend(field("Est. Time", &self.process.estimated_time));

        let header = Paragraph::new(vec![title, Line::from(details)])
            .block(Block::default().borders(Borders::BOTTOM));
        frame.render_widget(header, area);
    }
}

struct StatusBar<'a> {
    save_status: &'a str,
    navigating: bool,
    time_on_step: Duration,
}

impl StatusBar<'_> {
    fn render(&self, frame: &mut Frame, area: Rect) {
        let activity = if self.navigating {
            Span::styled("⟳ Working…", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("● Ready", Style::default().fg(Color::Green))
        };

        let secs = self.time_on_step.as_secs();
        let content = Line::from(vec![
            activity,
            Span::styled(
                format!("  {}", self.save_status),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                format!("  {}:{:02} on step", secs / 60, secs % 60),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                "  [Enter]Next [←]Back [s]ave [e]xport [F1]Help [Esc]Exit",
                Style::default().fg(Color::DarkGray),
            ),
        ]);

        let bar = Paragraph::new(content).block(Block::default().borders(Borders::TOP));
        frame.render_widget(bar, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_resets_cursor_on_step_change() {
        let mut screen = WizardScreen::new();
        screen.sync(Step::RiskReview, 5);
        screen.cursor_down(5);
        screen.cursor_down(5);
        assert_eq!(screen.cursor(), 2);

        screen.sync(Step::RiskReview, 2);
        assert_eq!(screen.cursor(), 1);

        screen.sync(Step::InherentRisk, 4);
        assert_eq!(screen.cursor(), 0);
    }

    #[test]
    fn test_cursor_stays_in_bounds() {
        let mut screen = WizardScreen::new();
        screen.cursor_up();
        assert_eq!(screen.cursor(), 0);
        screen.cursor_down(1);
        assert_eq!(screen.cursor(), 0);
        screen.cursor_down(0);
        assert_eq!(screen.cursor(), 0);
    }

    #[test]
    fn test_crumb_focus_wraps() {
        let mut screen = WizardScreen::new();
        screen.focus_prev_crumb();
        assert_eq!(screen.focused_crumb(), Some(Step::ReviewSubmit));
        screen.focus_next_crumb();
        assert_eq!(screen.focused_crumb(), Some(Step::RiskReview));

        screen.sync(Step::InherentRisk, 1);
        assert_eq!(screen.focused_crumb(), None);
    }

    #[test]
    fn test_selected_row_follows_cursor() {
        let mut form = FormDraft::default();
        form.toggle_risk("system-failure");
        form.toggle_risk("sanctions-screening");
        let mut screen = WizardScreen::new();
        screen.sync(Step::InherentRisk, 2);
        screen.cursor_down(2);
        let row = screen.selected_row(Step::InherentRisk, &form);
        assert!(matches!(row, Some(Row::Risk(_))));
    }
}
