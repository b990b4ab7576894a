//! Services module - the run workflow and its collaborators.
//!
//! Nothing here paints anything; presenters consume [`RunReport`]s, the
//! [`NotificationCenter`](crate::ui::NotificationCenter) channels, and the
//! [`StateManager`](crate::state::StateManager) event stream.
//!
//! # Components
//!
//! - [`FileValidator`]: media type and size policy for candidate files
//! - [`DetectionApi`] / [`HttpClient`]: the three remote calls (health, upload, process)
//! - [`UploadCoordinator`]: multipart upload yielding a [`RemoteFileId`](crate::models::RemoteFileId)
//! - [`ProcessingOrchestrator`]: the single-flight run state machine
//! - [`HealthProbe`]: advisory startup reachability check
//!
//! # Usage Example
//!
//! ```ignore
//! use tvd_client::services::{HttpClient, ProcessingOrchestrator};
//!
//! let api = Arc::new(HttpClient::new(config.api.clone())?);
//! let orchestrator = ProcessingOrchestrator::new(StateManager::new(), api, NotificationCenter::new());
//!
//! orchestrator.select_file(CandidateFile::from_path(path, None).await?)?;
//! let report = orchestrator.run().await?;
//! ```

pub mod client;
pub mod health;
pub mod orchestrator;
pub mod upload;
pub mod validation;

pub use client::{
    ApiReply, ClientError, DetectionApi, HttpClient, ProcessRequest, UploadBody, UploadForm,
    UploadResponse,
};
pub use health::HealthProbe;
pub use orchestrator::{ProcessingOrchestrator, RunError, RunReport};
pub use upload::{UploadCoordinator, UploadError};
pub use validation::{ACCEPTED_MEDIA_TYPES, FileValidator, ValidationError};
