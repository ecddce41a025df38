//! Transient user-facing notifications raised by store operations.

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Queue of notifications in arrival order; presentation drains it.
#[derive(Debug, Default)]
pub struct Notifier {
    queue: Mutex<Vec<Notification>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Success, message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Warning, message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(Notification::new(Level::Error, message));
    }

    pub fn push(&self, notification: Notification) {
        match notification.level {
            Level::Success => {
                tracing::info!(message = notification.message.as_str(), "notification")
            }
            Level::Warning | Level::Error => tracing::warn!(
                level = ?notification.level,
                message = notification.message.as_str(),
                "notification"
            ),
        }
        self.queue.lock().push(notification);
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.queue.lock())
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_arrival_order_and_empties_queue() {
        let notifier = Notifier::new();
        notifier.success("Task added");
        notifier.error("Failed to delete task");

        let drained = notifier.drain();
        assert_eq!(
            drained,
            vec![
                Notification::new(Level::Success, "Task added"),
                Notification::new(Level::Error, "Failed to delete task"),
            ]
        );
        assert!(notifier.is_empty());
    }
}
