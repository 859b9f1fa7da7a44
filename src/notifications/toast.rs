//! Toast queue with explicit expiry.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::{Notifier, Severity, DEFAULT_ERROR_TOAST_DURATION, DEFAULT_TOAST_DURATION};

/// Maximum number of toasts kept on screen at once
const MAX_VISIBLE: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
struct ToastQueue {
    next_id: u64,
    toasts: VecDeque<Toast>,
}

/// Shared toast surface.
///
/// Cloned behind an `Arc` into the wizard session (which raises toasts from
/// background tasks) and the UI (which renders and expires them).
#[derive(Debug)]
pub struct ToastCenter {
    queue: Mutex<ToastQueue>,
    duration: Duration,
    error_duration: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION, DEFAULT_ERROR_TOAST_DURATION)
    }
}

impl ToastCenter {
    pub fn new(duration: Duration, error_duration: Duration) -> Self {
        Self {
            queue: Mutex::new(ToastQueue::default()),
            duration,
            error_duration,
        }
    }

    /// How long a toast of this severity stays visible
    pub fn lifetime(&self, severity: Severity) -> Duration {
        if severity.is_error() {
            self.error_duration
        } else {
            self.duration
        }
    }

    /// Raise a toast at the given instant, returning its id
    pub fn push_at(&self, message: &str, severity: Severity, now: Instant) -> u64 {
        let mut queue = self.lock();
        queue.next_id += 1;
        let id = queue.next_id;
        queue.toasts.push_back(Toast {
            id,
            message: message.to_string(),
            severity,
            expires_at: now + self.lifetime(severity),
        });
        while queue.toasts.len() > MAX_VISIBLE {
            queue.toasts.pop_front();
        }
        id
    }

    pub fn push(&self, message: &str, severity: Severity) -> u64 {
        self.push_at(message, severity, Instant::now())
    }

    /// Dismiss a toast before it expires
    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.toasts.len();
        queue.toasts.retain(|t| t.id != id);
        queue.toasts.len() != before
    }

    /// Dismiss the most recent toast, if any
    pub fn dismiss_latest(&self) -> bool {
        self.lock().toasts.pop_back().is_some()
    }

    /// Drop expired toasts and return the ones still visible, oldest first
    pub fn active_at(&self, now: Instant) -> Vec<Toast> {
        let mut queue = self.lock();
        queue.toasts.retain(|t| !t.is_expired(now));
        queue.toasts.iter().cloned().collect()
    }

    pub fn active(&self) -> Vec<Toast> {
        self.active_at(Instant::now())
    }

    pub fn len(&self) -> usize {
        self.lock().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ToastQueue> {
        // A poisoned queue only holds display strings; keep using it.
        self.queue
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Notifier for ToastCenter {
    fn notify(&self, message: &str, severity: Severity) {
        tracing::debug!(severity = severity.label(), message, "toast");
        self.push(message, severity);
    }
}
