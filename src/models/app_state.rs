use super::detection::{RemoteFileId, SelectedFile};
use super::stats::StatsAggregator;
use std::fmt;

/// Lifecycle phase of the orchestration session.
///
/// ```text
/// Idle --select--> FileSelected --run--> Uploading --ok--> Detecting --ok--> Completed
///                                            |                 |
///                                            +------fail-------+----> Failed
/// Completed/Failed --select--> FileSelected
/// Failed --retry--> FileSelected
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    FileSelected,
    Uploading,
    Detecting,
    Completed,
    Failed,
}

impl SessionState {
    /// True while a run is between upload start and its terminal state.
    pub fn is_running(self) -> bool {
        matches!(self, SessionState::Uploading | SessionState::Detecting)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::FileSelected => "file-selected",
            SessionState::Uploading => "uploading",
            SessionState::Detecting => "detecting",
            SessionState::Completed => "completed",
            SessionState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Single source of truth for the orchestration session.
///
/// `AppState` is wrapped in `Arc<RwLock<AppState>>` by
/// [`StateManager`](crate::state::StateManager). Mutate it only through the
/// manager so change events are emitted.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub state: SessionState,

    /// At most one selected file at a time
    pub current_file: Option<SelectedFile>,
    /// Identifier issued for the current run's upload
    pub current_file_id: Option<RemoteFileId>,

    /// Single-flight guard
    pub is_processing: bool,

    /// Message of the most recent failed run
    pub last_error: Option<String>,

    pub stats: StatsAggregator,
}
