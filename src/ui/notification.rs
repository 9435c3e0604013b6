//! Transient user notifications
//!
//! Controllers push notifications into a [`Notifier`]; whatever presents them
//! (a toast area, a log, a test) drains the queue on its own schedule. The
//! queue is bounded and sheds its oldest entry when full.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use instant::Instant;
use std::time::Duration;

use crate::constants::{NOTIFICATION_BACKLOG, NOTIFICATION_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub duration: Duration,
    pub created_at: Instant,
}

impl Notification {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            kind,
            duration: Duration::from_millis(NOTIFICATION_MS),
            created_at: Instant::now(),
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.duration
    }
}

/// Cloneable sending side of the notification queue
#[derive(Clone)]
pub struct Notifier {
    sender: Sender<Notification>,
    receiver: Receiver<Notification>,
    duration: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(Duration::from_millis(NOTIFICATION_MS))
    }
}

impl Notifier {
    /// Creates a queue whose notifications last `duration` unless overridden
    pub fn new(duration: Duration) -> Self {
        Self::with_capacity(duration, NOTIFICATION_BACKLOG)
    }

    pub fn with_capacity(duration: Duration, capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            duration,
        }
    }

    pub fn notify(&self, notification: Notification) {
        log::debug!(
            "notification [{:?}] {}: {}",
            notification.kind,
            notification.title,
            notification.message
        );
        let mut pending = notification;
        loop {
            match self.sender.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(rejected)) => {
                    if let Ok(dropped) = self.receiver.try_recv() {
                        log::trace!("notification backlog full, dropping '{}'", dropped.title);
                    }
                    pending = rejected;
                }
                // The receiver lives in self, so this cannot happen
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }

    fn push(&self, title: &str, message: &str, kind: NotificationKind) {
        self.notify(Notification::new(title, message, kind).with_duration(self.duration));
    }

    pub fn info(&self, title: &str, message: &str) {
        self.push(title, message, NotificationKind::Info);
    }

    pub fn success(&self, title: &str, message: &str) {
        self.push(title, message, NotificationKind::Success);
    }

    pub fn warning(&self, title: &str, message: &str) {
        self.push(title, message, NotificationKind::Warning);
    }

    pub fn error(&self, title: &str, message: &str) {
        self.push(title, message, NotificationKind::Error);
    }

    /// Takes every queued notification, oldest first
    pub fn drain(&self) -> Vec<Notification> {
        self.receiver.try_iter().collect()
    }

    pub fn pending(&self) -> usize {
        self.receiver.len()
    }
}
