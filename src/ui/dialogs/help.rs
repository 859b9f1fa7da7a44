use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;
use crate::ui::keybindings::{shortcuts_by_category_for_context, ShortcutContext};
use rcsa_wizard::wizard::Step;

/// Contextual help for the active step plus the shortcut list
pub struct HelpDialog {
    pub visible: bool,
    step: Step,
}

impl HelpDialog {
    pub fn new() -> Self {
        Self {
            visible: false,
            step: Step::first(),
        }
    }

    pub fn show_for(&mut self, step: Step) {
        self.step = step;
        self.visible = true;
    }

    pub fn toggle_for(&mut self, step: Step) {
        if self.visible {
            self.visible = false;
        } else {
            self.show_for(step);
        }
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    fn lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .add_modifier(Modifier::BOLD)
            .fg(Color::Cyan);

        let mut lines = vec![Line::from(Span::styled(
            format!("{} Help", self.step.name()),
            heading,
        ))];
        lines.extend(self.step.help().iter().map(|l| Line::from(*l)));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Keyboard Shortcuts", heading)));

        let mut contexts = vec![ShortcutContext::Global];
        contexts.extend(ShortcutContext::for_step(self.step));

        for context in contexts {
            if context != ShortcutContext::Global {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    format!("In {}:", context.display_name()),
                    heading,
                )));
            }
            for (_, shortcuts) in shortcuts_by_category_for_context(context) {
                for shortcut in shortcuts {
                    lines.push(Line::from(vec![
                        Span::styled(
                            shortcut.key_display_padded(),
                            Style::default().fg(Color::Yellow),
                        ),
                        Span::raw(shortcut.description),
                    ]));
                }
            }
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Press any key to close",
            Style::default().fg(Color::Gray),
        )));
        lines
    }

    pub fn render(&self, frame: &mut Frame) {
        if !self.visible {
            return;
        }

        let area = centered_rect(70, 85, frame.area());
        frame.render_widget(Clear, area);

        let help = Paragraph::new(self.lines())
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Left);

        frame.render_widget(help, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(dialog: &HelpDialog) -> Vec<String> {
        dialog.lines().iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn test_help_dialog_toggle() {
        let mut dialog = HelpDialog::new();
        assert!(!dialog.visible);

        dialog.toggle_for(Step::ControlMapping);
        assert!(dialog.visible);

        dialog.toggle_for(Step::ControlMapping);
        assert!(!dialog.visible);
    }

    #[test]
    fn test_help_follows_step() {
        let mut dialog = HelpDialog::new();
        dialog.show_for(Step::InherentRisk);
        let lines = text(&dialog);
        assert_eq!(lines[0], "Inherent Risk Help");
        assert!(lines.iter().any(|l| l.contains("Cycle likelihood")));
        assert!(!lines.iter().any(|l| l.contains("Select all pre-identified")));
    }

    #[test]
    fn test_fallback_help_text() {
        let mut dialog = HelpDialog::new();
        dialog.show_for(Step::ResidualRisk);
        assert!(text(&dialog)
            .iter()
            .any(|l| l == "Contextual help for this step is being developed."));
    }
}
