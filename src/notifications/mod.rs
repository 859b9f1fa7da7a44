//! Transient user notifications.
//!
//! Toasts are raised through the [`Notifier`] trait by the wizard controller and
//! the store, and drained by the terminal UI on every frame. Each toast carries
//! an explicit expiry instead of an ambient timer, and can be dismissed early.

use serde::{Deserialize, Serialize};
use std::time::Duration;

mod schedule;
mod toast;

pub use schedule::{NoticeId, NoticeSchedule, ScheduledNotice};
pub use toast::{Toast, ToastCenter};

/// Default lifetime of a non-error toast
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Default lifetime of an error toast
pub const DEFAULT_ERROR_TOAST_DURATION: Duration = Duration::from_millis(5000);

/// Severity tag of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// Anything that can surface a message to the user.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Notifier that only logs; used by CLI commands where nothing is rendered.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Error => tracing::error!("{}", message),
            Severity::Warning => tracing::warn!("{}", message),
            Severity::Success | Severity::Info => tracing::info!("{}", message),
        }
    }
}
