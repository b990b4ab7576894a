//! The run workflow: selection, upload, detection, and reporting.
//!
//! [`ProcessingOrchestrator`] owns no state of its own. Session state lives in the
//! [`StateManager`], user-facing notices go through the [`NotificationCenter`],
//! and the remote calls go through a [`DetectionApi`].

use super::client::{ClientError, DetectionApi, ProcessRequest};
use super::upload::{UploadCoordinator, UploadError};
use super::validation::{FileValidator, ValidationError};
use crate::models::{CandidateFile, ProcessingResult, RemoteFileId, RunningStats, SelectedFile};
use crate::state::{StateManager, TransitionError};
use crate::ui::notifications::{NotificationCenter, Severity};
use crate::ui::renderer::{FileView, ResultRenderer, ResultsView};
use std::sync::Arc;
use thiserror::Error;

/// Failure message when the service gives no reason of its own.
pub const GENERIC_PROCESSING_FAILURE: &str = "Processing failed";

pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_COMPLETE: &str = "Complete";
pub const STATUS_ERROR: &str = "Error";

pub const UPLOAD_PROGRESS: (&str, &str) = ("Uploading file...", "Preparing for real-time detection");
pub const DETECT_PROGRESS: (&str, &str) = ("Real-Time Detection", "Processing with frame skipping...");

pub const UPLOADED_NOTICE: &str = "File uploaded - Starting real-time analysis";

/// Why a selection or run did not go through.
///
/// Display strings are what the user sees.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The session refused the transition; nothing changed
    #[error(transparent)]
    Rejected(#[from] TransitionError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Transport(#[from] ClientError),

    /// The service answered but reported failure
    #[error("{0}")]
    Service(String),
}

impl RunError {
    /// Errors that ended a run, as opposed to ones that stopped it from starting.
    pub fn is_run_failure(&self) -> bool {
        matches!(
            self,
            RunError::Upload(_) | RunError::Transport(_) | RunError::Service(_)
        )
    }
}

/// Everything a presenter needs after a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub file_id: RemoteFileId,
    pub result: ProcessingResult,
    pub view: ResultsView,
    pub stats: RunningStats,
}

/// Releases the single-flight guard and dismisses the progress indicator when
/// dropped, whichever way the run ends.
struct InFlightGuard<'a> {
    state: &'a StateManager,
    notifications: &'a NotificationCenter,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.state.finish_run();
        self.notifications.dismiss_progress();
    }
}

/// Drives one session through the run state machine.
pub struct ProcessingOrchestrator<A: ?Sized> {
    state: StateManager,
    api: Arc<A>,
    uploader: UploadCoordinator<A>,
    notifications: NotificationCenter,
    validator: FileValidator,
}

impl<A: DetectionApi + ?Sized> ProcessingOrchestrator<A> {
    pub fn new(state: StateManager, api: Arc<A>, notifications: NotificationCenter) -> Self {
        Self {
            state,
            uploader: UploadCoordinator::new(Arc::clone(&api)),
            api,
            notifications,
            validator: FileValidator::new(),
        }
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    /// Validate `candidate` and make it the current selection.
    pub fn select_file(&self, candidate: CandidateFile) -> Result<FileView, RunError> {
        let file = match self.validator.validate(candidate) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!("File rejected: {}", e);
                self.notifications.toast(e.to_string(), Severity::Error);
                return Err(e.into());
            }
        };

        let view = ResultRenderer::file(&file);
        if let Err(e) = self.state.select_file(file) {
            tracing::warn!("Selection refused: {}", e);
            self.notifications.toast(e.to_string(), Severity::Error);
            return Err(e.into());
        }

        tracing::info!("File selected: {} ({} MB, {})", view.name, view.size_mb, view.kind);
        self.notifications
            .toast(format!("File selected: {}", view.name), Severity::Success);
        Ok(view)
    }

    /// Failed -> FileSelected with the file of the failed run.
    pub fn retry(&self) -> Result<(), RunError> {
        match self.state.retry() {
            Ok(_) => {
                tracing::info!("Retrying with the previously selected file");
                Ok(())
            }
            Err(e) => {
                self.notifications.toast(e.to_string(), Severity::Error);
                Err(e.into())
            }
        }
    }

    /// Upload the selected file and run detection on it.
    ///
    /// A rejected trigger (run in flight, nothing selected, wrong phase) notifies
    /// and returns without touching the session. Once the run starts it ends in
    /// Completed or Failed, and the guard is released on every path.
    pub async fn run(&self) -> Result<RunReport, RunError> {
        let (file, _) = match self.state.begin_run() {
            Ok(started) => started,
            Err(e) => {
                tracing::warn!("Run rejected: {}", e);
                self.notifications.toast(e.to_string(), Severity::Error);
                return Err(e.into());
            }
        };

        let _guard = InFlightGuard {
            state: &self.state,
            notifications: &self.notifications,
        };

        tracing::info!("Run started for {}", file.name());
        self.notifications.set_status(STATUS_PROCESSING, Severity::Processing);
        self.notifications.show_progress(UPLOAD_PROGRESS.0, UPLOAD_PROGRESS.1);

        match self.execute(&file).await {
            Ok(report) => {
                let found = report.result.violation_count();
                tracing::info!(
                    "Run completed: {} violations, {} runs so far",
                    found,
                    report.stats.runs_processed
                );
                self.notifications.toast(
                    format!("Real-time detection complete! Found {} violations.", found),
                    Severity::Success,
                );
                self.notifications.set_status(STATUS_COMPLETE, Severity::Success);
                Ok(report)
            }
            Err(e) => {
                tracing::error!("Run failed: {}", e);
                self.state.fail_run(e.to_string());
                self.notifications.toast(format!("Error: {}", e), Severity::Error);
                self.notifications.set_status(STATUS_ERROR, Severity::Error);
                Err(e)
            }
        }
    }

    async fn execute(&self, file: &SelectedFile) -> Result<RunReport, RunError> {
        let file_id = self.uploader.upload(file).await?;

        self.state.enter_detecting(file_id.clone());
        self.notifications.toast(UPLOADED_NOTICE, Severity::Success);
        self.notifications.show_progress(DETECT_PROGRESS.0, DETECT_PROGRESS.1);

        let reply = self.api.process(ProcessRequest::new(file_id.clone())).await?;
        let status = reply.status;
        let success = reply.is_success();

        let result = match reply.body {
            Some(result) if success && result.success => result,
            Some(result) => {
                return Err(RunError::Service(
                    result
                        .error
                        .filter(|e| !e.is_empty())
                        .unwrap_or_else(|| GENERIC_PROCESSING_FAILURE.to_string()),
                ));
            }
            None => {
                return Err(RunError::Service(format!(
                    "{} (HTTP {})",
                    GENERIC_PROCESSING_FAILURE, status
                )));
            }
        };

        self.state.complete_run(&result);
        let stats = self.state.read(|s| s.stats.stats().clone());
        let view = ResultRenderer::render(&result);

        Ok(RunReport {
            file_id,
            result,
            view,
            stats,
        })
    }
}
