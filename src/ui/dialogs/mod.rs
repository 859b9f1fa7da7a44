mod confirm;
mod help;
mod import;

pub use confirm::{ConfirmDialog, ConfirmSelection};
pub use help::HelpDialog;
pub use import::{ImportDialog, ImportResult};

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// `percent_x` × `percent_y` of `r`, centered
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
