use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use rcsa_wizard::notifications::{Severity, Toast};

const TOAST_WIDTH: u16 = 48;

fn severity_style(severity: Severity) -> (Color, &'static str) {
    match severity {
        Severity::Success => (Color::Green, "✓"),
        Severity::Error => (Color::Red, "✗"),
        Severity::Warning => (Color::Yellow, "!"),
        Severity::Info => (Color::Cyan, "i"),
    }
}

/// Stack active toasts in the top-right corner, newest at the bottom
pub fn render_toasts(frame: &mut Frame, toasts: &[Toast]) {
    let screen = frame.area();
    let width = TOAST_WIDTH.min(screen.width);
    let x = screen.x + screen.width.saturating_sub(width + 1);
    let mut y = screen.y + 1;

    for toast in toasts {
        let inner_width = width.saturating_sub(4).max(1) as usize;
        let text_lines = toast.message.chars().count().div_ceil(inner_width).max(1) as u16;
        let height = text_lines + 2;
        if y + height > screen.y + screen.height {
            break;
        }

        let area = Rect::new(x, y, width, height);
        let (color, icon) = severity_style(toast.severity);
        frame.render_widget(Clear, area);
        let body = Paragraph::new(Line::from(vec![
            Span::styled(format!("{icon} "), Style::default().fg(color)),
            Span::raw(toast.message.as_str()),
        ]))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(body, area);
        y += height;
    }
}
