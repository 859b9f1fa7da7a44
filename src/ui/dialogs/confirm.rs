use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmSelection {
    Yes,
    No,
}

impl ConfirmSelection {
    fn toggle(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

/// Yes/No prompt used for leaving the wizard and clearing saved data
pub struct ConfirmDialog {
    pub visible: bool,
    pub selection: ConfirmSelection,
    title: &'static str,
    message: String,
}

impl ConfirmDialog {
    pub fn new(title: &'static str) -> Self {
        Self {
            visible: false,
            selection: ConfirmSelection::No,
            title,
            message: String::new(),
        }
    }

    /// Exit prompt reporting time spent and that progress is kept
    pub fn exit_message(minutes: u64) -> String {
        format!(
            "You've spent {minutes} minutes on this assessment. Your progress has been automatically saved.\n\nAre you sure you want to exit?"
        )
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.selection = ConfirmSelection::No;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn toggle_selection(&mut self) {
        self.selection = self.selection.toggle();
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(50, 30, frame.area());
        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(2), Constraint::Length(2)])
            .margin(1)
            .split(inner);

        let message = Paragraph::new(self.message.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::White));
        frame.render_widget(message, chunks[0]);

        let selected = |option: ConfirmSelection, color: Color| {
            if self.selection == option {
                Style::default()
                    .fg(Color::Black)
                    .bg(color)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(color)
            }
        };

        let buttons = Line::from(vec![
            Span::styled(" [Y]es ", selected(ConfirmSelection::Yes, Color::Green)),
            Span::raw("   "),
            Span::styled(" [N]o ", selected(ConfirmSelection::No, Color::Red)),
        ]);
        frame.render_widget(
            Paragraph::new(buttons).alignment(Alignment::Center),
            chunks[1],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_defaults_to_no() {
        let mut dialog = ConfirmDialog::new("Exit Assessment");
        dialog.show("sure?");
        assert!(dialog.visible);
        assert_eq!(dialog.selection, ConfirmSelection::No);

        dialog.toggle_selection();
        assert_eq!(dialog.selection, ConfirmSelection::Yes);

        dialog.show("again?");
        assert_eq!(dialog.selection, ConfirmSelection::No);
        assert_eq!(dialog.message(), "again?");
    }

    #[test]
    fn test_exit_message_mentions_minutes() {
        let message = ConfirmDialog::exit_message(12);
        assert!(message.starts_with("You've spent 12 minutes on this assessment."));
        assert!(message.contains("automatically saved"));
    }
}
