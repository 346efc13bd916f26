use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Error,
    Info,
}

#[derive(Debug)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
    pub expires_at: Instant,
}

const ERROR_TTL: Duration = Duration::from_secs(4);
const MAX_QUEUED: usize = 8;

/// Short-lived toasts. A message identical to the newest one only extends
/// its lifetime, so a server that keeps failing doesn't flood the queue.
pub struct Notifier {
    notifications: VecDeque<Notification>,
}

impl Notifier {
    pub fn new() -> Self {
        Self {
            notifications: VecDeque::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>, ttl: Duration) {
        self.push(message.into(), NotificationKind::Info, ttl, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), NotificationKind::Error, ERROR_TTL, Instant::now());
    }

    pub fn recent(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    pub fn prune_expired(&mut self) {
        self.prune_at(Instant::now());
    }

    fn prune_at(&mut self, now: Instant) {
        self.notifications.retain(|n| n.expires_at > now);
    }

    fn push(&mut self, message: String, kind: NotificationKind, ttl: Duration, now: Instant) {
        let expires_at = now + ttl;
        if let Some(last) = self.notifications.back_mut()
            && last.kind == kind
            && last.message == message
        {
            last.expires_at = expires_at;
            return;
        }
        if self.notifications.len() >= MAX_QUEUED {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            message,
            kind,
            expires_at,
        });
    }
}
