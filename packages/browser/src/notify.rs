// ABOUTME: Fire-and-forget user notifications raised by browser actions
// ABOUTME: Tracing-backed notifier plus an in-memory log a UI can drain

use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

/// Sink for user-facing messages. Calls never fail and never block.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);

    fn success(&self, _message: &str) {}
}

/// Writes notifications to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        warn!(target: "ayon_browser::notify", "{}", message);
    }

    fn success(&self, message: &str) {
        info!(target: "ayon_browser::notify", "{}", message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Error,
    Success,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// Queues notifications in memory until drained
#[derive(Debug, Default)]
pub struct NotificationLog {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Remove and return everything queued so far
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    /// Error messages currently queued, oldest first
    pub fn errors(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .map(|n| n.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&self, level: NotificationLevel, message: &str) {
        self.lock().push(Notification {
            level,
            message: message.to_string(),
        });
    }
}

impl Notifier for NotificationLog {
    fn error(&self, message: &str) {
        self.push(NotificationLevel::Error, message);
    }

    fn success(&self, message: &str) {
        self.push(NotificationLevel::Success, message);
    }
}
