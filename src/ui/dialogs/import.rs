use std::path::PathBuf;

use crossterm::event::KeyCode;
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportResult {
    /// Still typing
    Pending,
    Submit(PathBuf),
    Cancel,
}

/// Single-line prompt for the path of an exported assessment
pub struct ImportDialog {
    pub visible: bool,
    input: String,
}

impl ImportDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            input: String::new(),
        }
    }

    /// Open with `suggestion` prefilled (usually the exports directory)
    pub fn show(&mut self, suggestion: String) {
        self.input = suggestion;
        self.visible = true;
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn handle_key(&mut self, key: KeyCode) -> ImportResult {
        match key {
            KeyCode::Esc => {
                self.visible = false;
                ImportResult::Cancel
            }
            KeyCode::Enter => {
                let path = self.input.trim();
                if path.is_empty() {
                    return ImportResult::Pending;
                }
                self.visible = false;
                ImportResult::Submit(PathBuf::from(path))
            }
            KeyCode::Backspace => {
                self.input.pop();
                ImportResult::Pending
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                ImportResult::Pending
            }
            _ => ImportResult::Pending,
        }
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(60, 20, frame.area());
        frame.render_widget(Clear, area);

        let lines = vec![
            Line::from(Span::styled(
                "Path to an exported assessment (.json):",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::raw(self.input.as_str()),
                Span::styled("█", Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to import, Esc to cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let dialog = Paragraph::new(lines).block(
            Block::default()
                .title(" Import Assessment ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(dialog, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_and_submit() {
        let mut dialog = ImportDialog::new();
        dialog.show("./".to_string());
        for c in "a.json".chars() {
            assert_eq!(dialog.handle_key(KeyCode::Char(c)), ImportResult::Pending);
        }
        dialog.handle_key(KeyCode::Backspace);
        dialog.handle_key(KeyCode::Char('n'));
        assert_eq!(dialog.input(), "./a.json");

        assert_eq!(
            dialog.handle_key(KeyCode::Enter),
            ImportResult::Submit(PathBuf::from("./a.json"))
        );
        assert!(!dialog.visible);
    }

    #[test]
    fn test_empty_input_does_not_submit() {
        let mut dialog = ImportDialog::new();
        dialog.show(String::new());
        assert_eq!(dialog.handle_key(KeyCode::Enter), ImportResult::Pending);
        assert!(dialog.visible);
        assert_eq!(dialog.handle_key(KeyCode::Esc), ImportResult::Cancel);
        assert!(!dialog.visible);
    }
}
