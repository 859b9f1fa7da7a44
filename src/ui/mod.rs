pub mod dialogs;
pub mod keybindings;
pub mod terminal_guard;
pub mod toasts;
pub mod wizard;

pub use dialogs::{ConfirmDialog, ConfirmSelection, HelpDialog, ImportDialog, ImportResult};
pub use wizard::WizardScreen;
