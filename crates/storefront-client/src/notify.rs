//! # Toast Notifications
//!
//! Stores report outcomes to the user through a `Notifier`. The web shell
//! renders toasts; the CLI logs them; tests capture them on a channel.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::ClientError;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Toast {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Toast {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Toast {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == ToastLevel::Error
    }
}

impl From<&ClientError> for Toast {
    fn from(err: &ClientError) -> Self {
        Toast::error(err.to_string())
    }
}

/// Receives toasts from the stores.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Drops every toast.
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _toast: Toast) {}
}

/// Writes toasts to the log.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => warn!(message = %toast.message, "toast"),
            _ => info!(level = ?toast.level, message = %toast.message, "toast"),
        }
    }
}

/// Forwards toasts to an unbounded channel.
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Toast>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, toast: Toast) {
        // Receiver gone means nobody is rendering toasts any more
        let _ = self.tx.send(toast);
    }
}
