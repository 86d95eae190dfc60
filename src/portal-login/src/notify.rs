//! Transient user notifications ("toasts").

use parking_lot::Mutex;

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// A transient, non-blocking notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub kind: ToastKind,
    /// Headline.
    pub text1: String,
    /// Optional detail line.
    pub text2: Option<String>,
}

impl Toast {
    pub fn success(text1: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Success,
            text1: text1.into(),
            text2: None,
        }
    }

    pub fn error(text1: impl Into<String>, text2: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Error,
            text1: text1.into(),
            text2: Some(text2.into()),
        }
    }
}

/// Displays toasts to the user.
pub trait Notifier: Send + Sync {
    fn show(&self, toast: Toast);
}

/// Notifier that keeps every toast it is asked to show.
#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toasts shown so far, oldest first.
    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}
