//! Auto-dismissing notifications ("toasts").
//!
//! Raising a notification never blocks and never fails. Each one stays
//! visible for a fixed time-to-live measured against the injected clock.

use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Notifier {
    ttl: Duration,
    toasts: Vec<Toast>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, toasts: Vec::new() }
    }

    pub fn notify(&mut self, kind: ToastKind, message: impl Into<String>, now: DateTime<Utc>) {
        self.prune(now);
        self.toasts.push(Toast {
            kind,
            message: message.into(),
            raised_at: now,
        });
    }

    pub fn error(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.notify(ToastKind::Error, message, now);
    }

    pub fn success(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.notify(ToastKind::Success, message, now);
    }

    /// Toasts still on screen at `now`, oldest first.
    pub fn visible(&self, now: DateTime<Utc>) -> impl Iterator<Item = &Toast> {
        let ttl = self.ttl;
        self.toasts
            .iter()
            .filter(move |t| now >= t.raised_at && now - t.raised_at < ttl)
    }

    pub fn visible_count(&self, now: DateTime<Utc>) -> usize {
        self.visible(now).count()
    }

    /// Forgets toasts that have expired.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.toasts.retain(|t| now - t.raised_at < ttl);
    }
}
