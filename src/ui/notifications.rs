// Notification center - transient toasts, the persistent status badge, and the
// progress indicator.
//
// Each channel is a tokio watch channel, so only the latest value is ever
// observable: a burst of notices leaves the last one visible and nothing queues.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(3);

/// Severity class attached to toasts and the status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Processing,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Processing => "processing",
            Severity::Error => "error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic id; expiry only clears the toast it was scheduled for
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    pub label: String,
    pub severity: Severity,
}

/// Blocking progress indicator shown while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressNotice {
    pub title: String,
    pub message: String,
}

/// Fan-out point for user-facing notices.
///
/// Cheap to clone; clones share the same channels.
#[derive(Clone)]
pub struct NotificationCenter {
    toast_tx: Arc<watch::Sender<Option<Toast>>>,
    status_tx: Arc<watch::Sender<Option<StatusIndicator>>>,
    progress_tx: Arc<watch::Sender<Option<ProgressNotice>>>,
    next_toast_id: Arc<AtomicU64>,
    toast_duration: Duration,
}

impl NotificationCenter {
    pub fn new() -> Self {
        Self::with_toast_duration(TOAST_DURATION)
    }

    pub fn with_toast_duration(toast_duration: Duration) -> Self {
        let (toast_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(None);
        let (progress_tx, _) = watch::channel(None);
        Self {
            toast_tx: Arc::new(toast_tx),
            status_tx: Arc::new(status_tx),
            progress_tx: Arc::new(progress_tx),
            next_toast_id: Arc::new(AtomicU64::new(1)),
            toast_duration,
        }
    }

    /// Show a toast, replacing any visible one, and schedule its dismissal.
    ///
    /// Dismissal needs a tokio runtime; without one the toast stays until the
    /// next toast replaces it.
    pub fn toast(&self, message: impl Into<String>, severity: Severity) -> u64 {
        let id = self.next_toast_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.into(),
            severity,
        };

        match severity {
            Severity::Error => tracing::warn!("[toast:{}] {}", severity, toast.message),
            _ => tracing::info!("[toast:{}] {}", severity, toast.message),
        }

        self.toast_tx.send_replace(Some(toast));

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let toast_tx = Arc::clone(&self.toast_tx);
                let duration = self.toast_duration;
                handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    toast_tx.send_if_modified(|current| match current {
                        Some(toast) if toast.id == id => {
                            *current = None;
                            true
                        }
                        _ => false,
                    });
                });
            }
            Err(_) => tracing::debug!("No runtime available, toast {} will not auto-dismiss", id),
        }

        id
    }

    /// Replace the status badge.
    pub fn set_status(&self, label: impl Into<String>, severity: Severity) {
        let status = StatusIndicator {
            label: label.into(),
            severity,
        };
        tracing::info!("[status:{}] {}", severity, status.label);
        self.status_tx.send_replace(Some(status));
    }

    /// Show or update the progress indicator.
    pub fn show_progress(&self, title: impl Into<String>, message: impl Into<String>) {
        let notice = ProgressNotice {
            title: title.into(),
            message: message.into(),
        };
        tracing::debug!("[progress] {} - {}", notice.title, notice.message);
        self.progress_tx.send_replace(Some(notice));
    }

    pub fn dismiss_progress(&self) {
        self.progress_tx.send_if_modified(|current| current.take().is_some());
    }

    pub fn current_toast(&self) -> Option<Toast> {
        self.toast_tx.borrow().clone()
    }

    pub fn current_status(&self) -> Option<StatusIndicator> {
        self.status_tx.borrow().clone()
    }

    pub fn current_progress(&self) -> Option<ProgressNotice> {
        self.progress_tx.borrow().clone()
    }

    pub fn subscribe_toasts(&self) -> watch::Receiver<Option<Toast>> {
        self.toast_tx.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_without_runtime() {
        let center = NotificationCenter::new();
        center.toast("hello", Severity::Info);

        let toast = center.current_toast().unwrap();
        assert_eq!(toast.message, "hello");
        assert_eq!(toast.severity, Severity::Info);
    }

    #[test]
    fn test_new_toast_supersedes() {
        let center = NotificationCenter::new();
        let first = center.toast("first", Severity::Info);
        let second = center.toast("second", Severity::Error);

        assert!(second > first);
        let toast = center.current_toast().unwrap();
        assert_eq!(toast.id, second);
        assert_eq!(toast.message, "second");
    }

    #[tokio::test(start_paused = true)]
    async fn test_toast_auto_dismisses() {
        let center = NotificationCenter::new();
        center.toast("bye", Severity::Success);

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert!(center.current_toast().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(center.current_toast().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_keeps_newer_toast() {
        let center = NotificationCenter::new();
        center.toast("old", Severity::Info);

        tokio::time::sleep(Duration::from_secs(2)).await;
        center.toast("new", Severity::Info);

        // The first toast's timer fires here and must not clear the second
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(center.current_toast().unwrap().message, "new");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(center.current_toast().is_none());
    }

    #[test]
    fn test_status_persists_until_replaced() {
        let center = NotificationCenter::new();
        center.set_status("Processing...", Severity::Processing);
        assert_eq!(center.current_status().unwrap().label, "Processing...");

        center.set_status("Complete", Severity::Success);
        let status = center.current_status().unwrap();
        assert_eq!(status.label, "Complete");
        assert_eq!(status.severity, Severity::Success);
    }

    #[test]
    fn test_progress_show_and_dismiss() {
        let center = NotificationCenter::new();
        center.show_progress("Uploading file...", "Preparing");
        assert_eq!(center.current_progress().unwrap().title, "Uploading file...");

        center.dismiss_progress();
        assert!(center.current_progress().is_none());
    }

    #[test]
    fn test_subscriber_sees_latest_only() {
        let center = NotificationCenter::new();
        let mut rx = center.subscribe_toasts();

        center.toast("one", Severity::Info);
        center.toast("two", Severity::Info);
        center.toast("three", Severity::Info);

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seen.message, "three");
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_clones_share_channels() {
        let center = NotificationCenter::new();
        let clone = center.clone();
        clone.set_status("Error", Severity::Error);
        assert_eq!(center.current_status().unwrap().label, "Error");
    }
}
