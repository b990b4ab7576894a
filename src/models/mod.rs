//! Data models for the detection client.
//!
//! - [`CandidateFile`] / [`SelectedFile`]: a file before and after validation
//! - [`RemoteFileId`]: identifier issued by the upload endpoint
//! - [`Violation`] / [`ProcessingResult`]: what the detection service returns
//! - [`StatsAggregator`] / [`RunningStats`]: counters across completed runs
//! - [`AppState`] / [`SessionState`]: the session context held by
//!   [`StateManager`](crate::state::StateManager)
//! - [`ClientConfig`]: settings loaded from `client.yaml`

pub mod app_state;
pub mod config;
pub mod detection;
pub mod stats;

pub use app_state::{AppState, SessionState};
pub use config::{ApiSettings, ClientConfig, LoggingSettings};
pub use detection::{
    CandidateFile, FRAME_SKIP, MAX_UPLOAD_BYTES, Payload, ProcessingResult, RemoteFileId,
    SelectedFile, Violation, media_type_for_path, subtype_token,
};
pub use stats::{DETECTION_ACCURACY_LABEL, RunningStats, StatsAggregator, round2};
