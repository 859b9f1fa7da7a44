//! Raw-mode / alternate-screen guard for the wizard.

use anyhow::{Context, Result};
use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

/// Restores the terminal when dropped, on early `?` returns as well as normal exit.
///
/// Panics are covered separately by [`install_panic_hook`].
pub struct TerminalGuard {
    active: AtomicBool,
}

impl TerminalGuard {
    pub fn new() -> Result<Self> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("Failed to enter alternate screen")?;
        Ok(Self {
            active: AtomicBool::new(true),
        })
    }

    /// Restore now; later drops are no-ops
    pub fn restore(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            Self::cleanup();
        }
    }

    fn cleanup() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

/// Restore the terminal before the default hook prints the panic message
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalGuard::cleanup();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_runs_once() {
        let guard = TerminalGuard {
            active: AtomicBool::new(true),
        };
        guard.restore();
        assert!(!guard.active.load(Ordering::SeqCst));
        guard.restore();
        drop(guard);
    }

    #[test]
    fn test_inactive_guard_drop_is_noop() {
        let guard = TerminalGuard {
            active: AtomicBool::new(false),
        };
        drop(guard);
    }
}
