// tvd-client - client for the traffic violation detection service
//
// This is the library crate containing the run workflow, session state, and
// presentation mapping. The binary crate (main.rs) provides the terminal front end.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppState, ClientConfig, ProcessingResult, SessionState};
pub use services::{DetectionApi, HttpClient, ProcessingOrchestrator, RunError};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
