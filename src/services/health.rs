use super::client::DetectionApi;
use crate::ui::notifications::{NotificationCenter, Severity};
use std::sync::Arc;
use tokio::task::JoinHandle;

pub const HEALTHY_NOTICE: &str = "System ready";
pub const UNHEALTHY_NOTICE: &str = "Backend connection failed. Please ensure the server is running.";

/// One-shot backend reachability check.
///
/// The outcome is advisory only and never gates the run workflow.
pub struct HealthProbe<A: ?Sized> {
    api: Arc<A>,
    notifications: NotificationCenter,
}

impl<A: DetectionApi + ?Sized + 'static> HealthProbe<A> {
    pub fn new(api: Arc<A>, notifications: NotificationCenter) -> Self {
        Self { api, notifications }
    }

    /// Probe once and post the outcome. Returns whether the backend answered 2xx.
    pub async fn check(&self) -> bool {
        let healthy = match self.api.health().await {
            Ok(status) if (200..300).contains(&status) => {
                tracing::info!("Backend healthy (HTTP {})", status);
                true
            }
            Ok(status) => {
                tracing::warn!("Backend health check returned HTTP {}", status);
                false
            }
            Err(e) => {
                tracing::warn!("Backend health check failed: {}", e);
                false
            }
        };

        if healthy {
            self.notifications.toast(HEALTHY_NOTICE, Severity::Success);
        } else {
            self.notifications.toast(UNHEALTHY_NOTICE, Severity::Error);
        }
        healthy
    }

    /// Run [`check`](Self::check) in the background.
    pub fn spawn(self) -> JoinHandle<bool> {
        tokio::spawn(async move { self.check().await })
    }
}
