use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a notice stays visible.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);

/// Upper bound on queued notices; the oldest are dropped first.
const MAX_NOTICES: usize = 32;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// A short-lived, self-dismissing message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
    pub created_at: Instant,
}

impl Notice {
    /// Whether the notice has outlived [`NOTICE_TTL`] at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created_at) >= NOTICE_TTL
    }
}

/// Queue of transient notices.
#[derive(Debug, Default)]
pub struct Notifications {
    queue: VecDeque<Notice>,
    next_id: u64,
}

impl Notifications {
    /// Queue a notice stamped with the current time.
    pub fn push(&mut self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        self.push_at(level, message, Instant::now())
    }

    /// Queue a notice stamped `at`.
    pub fn push_at(&mut self, level: NoticeLevel, message: impl Into<String>, at: Instant) -> u64 {
        self.next_id += 1;
        self.queue.push_back(Notice {
            id: self.next_id,
            level,
            message: message.into(),
            created_at: at,
        });
        while self.queue.len() > MAX_NOTICES {
            self.queue.pop_front();
        }
        self.next_id
    }

    /// Remove a notice before it expires.
    pub fn dismiss(&mut self, id: u64) {
        self.queue.retain(|n| n.id != id);
    }

    /// Notices still visible at `now`, oldest first. Expired ones are dropped.
    pub fn active(&mut self, now: Instant) -> Vec<Notice> {
        self.queue.retain(|n| !n.is_expired(now));
        self.queue.iter().cloned().collect()
    }

    /// Take every queued notice, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        self.queue.drain(..).collect()
    }

    /// Most recent notice, if any.
    pub fn latest(&self) -> Option<&Notice> {
        self.queue.back()
    }

    /// Number of queued notices.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether no notices are queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
