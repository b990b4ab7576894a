// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for presenters.

use crate::models::{AppState, ProcessingResult, RemoteFileId, SelectedFile, SessionState};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use thiserror::Error;
use tokio::sync::broadcast;

/// Message recorded when a run is dropped before reaching a terminal state.
pub const RUN_ABORTED_MESSAGE: &str = "Run aborted";

/// Change events emitted when state is modified
///
/// These events are emitted to notify interested parties (primarily presenters)
/// about state changes without requiring them to poll the state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// The session moved between lifecycle phases
    PhaseChanged {
        from: SessionState,
        to: SessionState,
    },

    /// A new file replaced the current selection
    FileSelected {
        name: String,
        size: u64,
    },

    /// The in-flight guard was taken
    ProcessingStarted,

    /// The in-flight guard was released
    ProcessingFinished {
        state: SessionState,
    },

    /// Running counters changed after a completed run
    StatsUpdated {
        total_violations: u64,
        runs_processed: u64,
        avg_violations: f64,
    },
}

/// Transitions the session refuses to make.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A detection run is already in progress. Please wait for it to finish.")]
    RunInProgress,

    #[error("Please select a file first.")]
    NoFileSelected,

    #[error("Cannot start a run while {0}; select a new file or retry.")]
    NotReady(SessionState),
}

/// Thread-safe session manager with event emission
///
/// This is the explicit session context that:
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Enforces the session state machine and the single-flight guard
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// # Usage
///
/// Always use `StateManager` instead of accessing [`AppState`] directly:
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) for mutations with automatic event emission
/// - [`subscribe()`](Self::subscribe) for listening to state changes
///
/// Clones share the same underlying state.
pub struct StateManager {
    /// The session state protected by RwLock for thread-safe access
    state: Arc<RwLock<AppState>>,

    /// Broadcast channel for emitting state change events
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state
    ///
    /// # Returns
    /// A new StateManager with a broadcast channel buffer of 100 events
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get a read-only snapshot of the current state
    pub fn snapshot(&self) -> AppState {
        self.read_lock().clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_processing);
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_lock();
        f(&state)
    }

    /// Update the state and emit change events
    ///
    /// # Returns
    /// A vector of StateChange events that were emitted
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        self.update_with(update_fn).1
    }

    /// Update the state under a single write lock, returning the closure's output
    /// alongside the emitted events.
    ///
    /// Check-and-set transitions go through here so no other writer can interleave.
    pub fn update_with<F, R>(&self, update_fn: F) -> (R, Vec<StateChange>)
    where
        F: FnOnce(&mut AppState) -> R,
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        let output = update_fn(&mut state);

        let changes = Self::detect_changes(&old_state, &state);
        for change in &changes {
            // Ignore send errors - it's OK if no one is listening
            let _ = self.state_tx.send(change.clone());
        }

        (output, changes)
    }

    /// Subscribe to state change events
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.state != new.state {
            changes.push(StateChange::PhaseChanged {
                from: old.state,
                to: new.state,
            });
        }

        if old.current_file != new.current_file {
            if let Some(file) = &new.current_file {
                changes.push(StateChange::FileSelected {
                    name: file.name().to_string(),
                    size: file.size(),
                });
            }
        }

        if old.is_processing != new.is_processing {
            if new.is_processing {
                changes.push(StateChange::ProcessingStarted);
            } else {
                changes.push(StateChange::ProcessingFinished { state: new.state });
            }
        }

        if old.stats.stats() != new.stats.stats() {
            let stats = new.stats.stats();
            changes.push(StateChange::StatsUpdated {
                total_violations: stats.total_violations,
                runs_processed: stats.runs_processed,
                avg_violations: stats.avg_violations,
            });
        }

        changes
    }

    // Session transitions

    /// Make `file` the current selection.
    ///
    /// Valid from every phase except while a run is in flight.
    pub fn select_file(&self, file: SelectedFile) -> Result<Vec<StateChange>, TransitionError> {
        let (outcome, changes) = self.update_with(|state| {
            if state.is_processing {
                return Err(TransitionError::RunInProgress);
            }
            state.current_file = Some(file);
            state.current_file_id = None;
            state.last_error = None;
            state.state = SessionState::FileSelected;
            Ok(())
        });
        outcome.map(|()| changes)
    }

    /// Take the single-flight guard and enter Uploading.
    ///
    /// Returns the file to upload. Fails without touching state when a run is
    /// already in flight or the session is not in FileSelected.
    pub fn begin_run(&self) -> Result<(SelectedFile, Vec<StateChange>), TransitionError> {
        let (outcome, changes) = self.update_with(|state| {
            if state.is_processing {
                return Err(TransitionError::RunInProgress);
            }
            let file = state
                .current_file
                .clone()
                .ok_or(TransitionError::NoFileSelected)?;
            if state.state != SessionState::FileSelected {
                return Err(TransitionError::NotReady(state.state));
            }
            state.is_processing = true;
            state.state = SessionState::Uploading;
            state.current_file_id = None;
            state.last_error = None;
            Ok(file)
        });
        outcome.map(|file| (file, changes))
    }

    /// Upload finished; the run moves on to detection.
    pub fn enter_detecting(&self, file_id: RemoteFileId) -> Vec<StateChange> {
        self.update(|state| {
            state.current_file_id = Some(file_id);
            state.state = SessionState::Detecting;
        })
    }

    /// Record a successful run: fold it into the counters and consume the file.
    pub fn complete_run(&self, result: &ProcessingResult) -> Vec<StateChange> {
        self.update(|state| {
            state.stats.record(result);
            state.last_error = None;
            state.current_file = None;
            state.state = SessionState::Completed;
        })
    }

    /// Record a failed run. Counters are untouched and the file is kept for retry.
    pub fn fail_run(&self, message: String) -> Vec<StateChange> {
        self.update(|state| {
            state.last_error = Some(message);
            state.state = SessionState::Failed;
        })
    }

    /// Release the single-flight guard.
    ///
    /// A run still in Uploading or Detecting at this point never reached a
    /// terminal state and is marked Failed.
    pub fn finish_run(&self) -> Vec<StateChange> {
        self.update(|state| {
            if state.state.is_running() {
                state.state = SessionState::Failed;
                state.last_error = Some(RUN_ABORTED_MESSAGE.to_string());
            }
            state.is_processing = false;
        })
    }

    /// Failed -> FileSelected, reusing the file of the failed run.
    pub fn retry(&self) -> Result<Vec<StateChange>, TransitionError> {
        let (outcome, changes) = self.update_with(|state| {
            if state.is_processing {
                return Err(TransitionError::RunInProgress);
            }
            if state.current_file.is_none() {
                return Err(TransitionError::NoFileSelected);
            }
            if state.state != SessionState::Failed {
                return Err(TransitionError::NotReady(state.state));
            }
            state.state = SessionState::FileSelected;
            state.last_error = None;
            Ok(())
        });
        outcome.map(|()| changes)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

// Make StateManager cloneable for sharing across tasks
impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}
