//! One-shot delayed notices (welcome message, encouragement nudges).

use std::time::{Duration, Instant};

use super::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NoticeId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledNotice {
    pub id: NoticeId,
    pub due_at: Instant,
    pub message: String,
    pub severity: Severity,
    /// Only deliver while the wizard is on this step
    pub only_on_step: Option<u8>,
}

/// Pending notices, polled by the UI loop.
#[derive(Debug, Default)]
pub struct NoticeSchedule {
    next_id: u64,
    pending: Vec<ScheduledNotice>,
}

impl NoticeSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(
        &mut self,
        due_at: Instant,
        message: impl Into<String>,
        severity: Severity,
        only_on_step: Option<u8>,
    ) -> NoticeId {
        self.next_id += 1;
        let id = NoticeId(self.next_id);
        self.pending.push(ScheduledNotice {
            id,
            due_at,
            message: message.into(),
            severity,
            only_on_step,
        });
        id
    }

    pub fn schedule(
        &mut self,
        delay: Duration,
        message: impl Into<String>,
        severity: Severity,
        only_on_step: Option<u8>,
    ) -> NoticeId {
        self.schedule_at(Instant::now() + delay, message, severity, only_on_step)
    }

    pub fn cancel(&mut self, id: NoticeId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|n| n.id != id);
        before != self.pending.len()
    }

    /// Remove and return every notice due at `now`.
    ///
    /// Step-bound notices whose step no longer matches are dropped, not delivered.
    pub fn take_due(&mut self, now: Instant, current_step: u8) -> Vec<ScheduledNotice> {
        let (due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|n| n.due_at <= now);
        self.pending = pending;
        due.into_iter()
            .filter(|n| n.only_on_step.map_or(true, |s| s == current_step))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
