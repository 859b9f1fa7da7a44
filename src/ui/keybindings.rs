//! Keyboard shortcut registry.
//!
//! Single source of truth for the wizard's shortcuts; the help dialog renders
//! straight from [`SHORTCUTS`].

use crossterm::event::KeyCode;

use rcsa_wizard::wizard::Step;

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key (e.g., lowercase variant or arrow key)
    pub alt_key: Option<KeyCode>,
    /// Overrides the rendered key text for chords such as Alt+1..7
    pub label: Option<&'static str>,
    pub description: &'static str,
    pub category: ShortcutCategory,
    pub context: ShortcutContext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutCategory {
    General,
    Navigation,
    Editing,
    Data,
}

/// Where a shortcut is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortcutContext {
    /// Every step
    Global,
    RiskReview,
    InherentRisk,
    /// Steps whose rows cycle through a set of values
    RowEditing,
}

impl ShortcutCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutCategory::General => "General",
            ShortcutCategory::Navigation => "Navigation",
            ShortcutCategory::Editing => "Editing",
            ShortcutCategory::Data => "Data",
        }
    }

    /// All categories in display order
    pub fn all() -> &'static [ShortcutCategory] {
        &[
            ShortcutCategory::General,
            ShortcutCategory::Navigation,
            ShortcutCategory::Editing,
            ShortcutCategory::Data,
        ]
    }
}

impl ShortcutContext {
    pub fn display_name(&self) -> &'static str {
        match self {
            ShortcutContext::Global => "Wizard",
            ShortcutContext::RiskReview => "Risk Review",
            ShortcutContext::InherentRisk => "Inherent Risk",
            ShortcutContext::RowEditing => "Mapping, Effectiveness, Response",
        }
    }

    /// Step-specific context for `step`, if it has extra shortcuts
    pub fn for_step(step: Step) -> Option<ShortcutContext> {
        match step {
            Step::RiskReview => Some(ShortcutContext::RiskReview),
            Step::InherentRisk => Some(ShortcutContext::InherentRisk),
            Step::ControlMapping | Step::ControlEffectiveness | Step::RiskResponse => {
                Some(ShortcutContext::RowEditing)
            }
            Step::ResidualRisk | Step::ReviewSubmit => None,
        }
    }
}

impl Shortcut {
    /// Format key for display (e.g., "q", "Enter", "j/↓")
    pub fn key_display(&self) -> String {
        if let Some(label) = self.label {
            return label.to_string();
        }
        let primary = format_keycode(&self.key);
        match &self.alt_key {
            Some(alt) => format!("{}/{}", primary, format_keycode(alt)),
            None => primary,
        }
    }

    /// Format key for the help dialog (left-padded to 10 chars)
    pub fn key_display_padded(&self) -> String {
        format!("{:<10}", self.key_display())
    }
}

fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        KeyCode::Up => "↑".to_string(),
        KeyCode::Down => "↓".to_string(),
        KeyCode::Left => "←".to_string(),
        KeyCode::Right => "→".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => format!("{:?}", key),
    }
}

const fn shortcut(
    key: KeyCode,
    alt_key: Option<KeyCode>,
    description: &'static str,
    category: ShortcutCategory,
    context: ShortcutContext,
) -> Shortcut {
    Shortcut {
        key,
        alt_key,
        label: None,
        description,
        category,
        context,
    }
}

use ShortcutCategory::{Data, Editing, General, Navigation};
use ShortcutContext::{Global, InherentRisk, RiskReview, RowEditing};

/// Static registry of all keyboard shortcuts
pub static SHORTCUTS: &[Shortcut] = &[
    // General
    shortcut(KeyCode::Char('q'), None, "Save and quit", General, Global),
    shortcut(KeyCode::Esc, None, "Exit assessment", General, Global),
    shortcut(KeyCode::F(1), None, "Help for this step", General, Global),
    shortcut(KeyCode::Char('?'), None, "Toggle help", General, Global),
    shortcut(KeyCode::Char('d'), None, "Dismiss latest notice", General, Global),
    // Navigation
    shortcut(KeyCode::Enter, Some(KeyCode::Right), "Next step / submit", Navigation, Global),
    shortcut(KeyCode::Left, Some(KeyCode::Backspace), "Previous step", Navigation, Global),
    Shortcut {
        key: KeyCode::Char('1'),
        alt_key: None,
        label: Some("Alt+1..7"),
        description: "Jump to step",
        category: Navigation,
        context: Global,
    },
    shortcut(KeyCode::Tab, Some(KeyCode::BackTab), "Highlight step in progress bar", Navigation, Global),
    shortcut(KeyCode::Char('g'), None, "Go to highlighted step", Navigation, Global),
    shortcut(KeyCode::Char('j'), Some(KeyCode::Down), "Move down", Navigation, Global),
    shortcut(KeyCode::Char('k'), Some(KeyCode::Up), "Move up", Navigation, Global),
    // Data
    shortcut(KeyCode::Char('s'), None, "Save draft", Data, Global),
    shortcut(KeyCode::Char('e'), None, "Export assessment", Data, Global),
    shortcut(KeyCode::Char('o'), None, "Import assessment", Data, Global),
    shortcut(KeyCode::Char('x'), None, "Clear saved assessment", Data, Global),
    // Risk review
    shortcut(KeyCode::Char(' '), None, "Select / deselect risk", Editing, RiskReview),
    shortcut(KeyCode::Char('a'), None, "Select all pre-identified", Editing, RiskReview),
    shortcut(KeyCode::Char('c'), None, "Clear selection", Editing, RiskReview),
    shortcut(KeyCode::Char('f'), None, "Show operational only", Editing, RiskReview),
    // Inherent risk
    shortcut(KeyCode::Char('l'), None, "Cycle likelihood", Editing, InherentRisk),
    shortcut(KeyCode::Char('i'), None, "Cycle impact", Editing, InherentRisk),
    // Row editing
    shortcut(KeyCode::Char(' '), None, "Toggle / cycle value", Editing, RowEditing),
];

/// Shortcuts for a context, grouped by category in display order
pub fn shortcuts_by_category_for_context(
    context: ShortcutContext,
) -> Vec<(ShortcutCategory, Vec<&'static Shortcut>)> {
    ShortcutCategory::all()
        .iter()
        .filter_map(|category| {
            let shortcuts: Vec<&Shortcut> = SHORTCUTS
                .iter()
                .filter(|s| s.context == context && s.category == *category)
                .collect();
            (!shortcuts.is_empty()).then_some((*category, shortcuts))
        })
        .collect()
}
