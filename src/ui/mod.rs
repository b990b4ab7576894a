// UI module - presentation without a toolkit
//
// This module contains:
// - NotificationCenter: toast, status, and progress channels
// - ResultRenderer: pure mapping from results to view models
// - TerminalPainter: paints view models to any writer

pub mod notifications;
pub mod renderer;
pub mod terminal;

pub use notifications::{NotificationCenter, ProgressNotice, Severity, StatusIndicator, Toast};
pub use renderer::{FileView, ResultRenderer, ResultsView, StatsView, ViolationCard, ViolationList};
pub use terminal::TerminalPainter;
