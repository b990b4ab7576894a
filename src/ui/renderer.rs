//! Pure mapping from processing results to view models.
//!
//! Nothing here touches a terminal or any other surface; painting lives in
//! [`crate::ui::terminal`].

use crate::models::{
    DETECTION_ACCURACY_LABEL, ProcessingResult, RunningStats, SelectedFile, Violation,
};
use serde::Serialize;

/// Shown wherever an optional display value is missing.
pub const PLACEHOLDER: &str = "N/A";
pub const NO_VIOLATIONS: &str = "No violations detected";
pub const NORMAL_BADGE: &str = "NORMAL";

/// How many entries the top-violations block shows.
pub const TOP_VIOLATIONS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Emphasis {
    Alert,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub total_frames: u64,
    /// Two decimals, or [`PLACEHOLDER`]
    pub frame_rate: String,
    pub violations_found: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationCard {
    /// 1-based position in the list
    pub index: usize,
    pub frame: u64,
    pub timestamp: String,
    pub badge: String,
    pub emphasis: Emphasis,
    pub plate: String,
    pub plate_confidence: String,
    pub speed: String,
    pub excess_speed: String,
    pub speed_limit: String,
    pub vehicle_confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViolationList {
    Empty { placeholder: String },
    Cards { cards: Vec<ViolationCard> },
}

impl ViolationList {
    pub fn cards(&self) -> &[ViolationCard] {
        match self {
            ViolationList::Empty { .. } => &[],
            ViolationList::Cards { cards } => cards,
        }
    }
}

/// Everything shown for one completed run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsView {
    pub summary: SummaryView,
    pub top_violations: ViolationList,
    pub violations: ViolationList,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsView {
    pub total_violations: u64,
    pub runs_processed: u64,
    pub avg_violations: String,
    pub detection_accuracy: String,
}

/// What the upload area shows for a selected file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileView {
    pub name: String,
    /// MiB, two decimals
    pub size_mb: String,
    pub kind: String,
}

/// Maps results into view models.
pub struct ResultRenderer;

impl ResultRenderer {
    pub fn render(result: &ProcessingResult) -> ResultsView {
        let top = &result.violations[..result.violations.len().min(TOP_VIOLATIONS)];

        ResultsView {
            summary: Self::summary(result),
            top_violations: Self::list(top),
            violations: Self::list(&result.violations),
        }
    }

    pub fn summary(result: &ProcessingResult) -> SummaryView {
        SummaryView {
            total_frames: result.total_frames.unwrap_or(0),
            frame_rate: result
                .fps
                .map(|fps| format!("{:.2}", fps))
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            violations_found: result.violation_count(),
        }
    }

    /// Cards for `violations` in received order, or the empty placeholder.
    pub fn list(violations: &[Violation]) -> ViolationList {
        if violations.is_empty() {
            return ViolationList::Empty {
                placeholder: NO_VIOLATIONS.to_string(),
            };
        }

        ViolationList::Cards {
            cards: violations
                .iter()
                .enumerate()
                .map(|(i, v)| Self::card(i + 1, v))
                .collect(),
        }
    }

    pub fn card(index: usize, violation: &Violation) -> ViolationCard {
        let (badge, emphasis) = if violation.is_violation {
            (
                violation.violation_type.clone().unwrap_or_default(),
                Emphasis::Alert,
            )
        } else {
            (NORMAL_BADGE.to_string(), Emphasis::Normal)
        };

        ViolationCard {
            index,
            frame: violation.frame,
            timestamp: format!("{:.2}", violation.timestamp),
            badge,
            emphasis,
            plate: violation
                .plate_text
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            plate_confidence: percent_or_placeholder(violation.plate_confidence),
            speed: format!("{:.1}", violation.estimated_speed),
            excess_speed: format!("{:.1}", violation.excess_speed),
            speed_limit: violation
                .speed_limit
                .map(|limit| limit.to_string())
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            vehicle_confidence: percent_or_placeholder(violation.vehicle_confidence),
        }
    }

    pub fn stats(stats: &RunningStats) -> StatsView {
        StatsView {
            total_violations: stats.total_violations,
            runs_processed: stats.runs_processed,
            avg_violations: format!("{:.2}", stats.avg_violations),
            detection_accuracy: DETECTION_ACCURACY_LABEL.to_string(),
        }
    }

    pub fn file(file: &SelectedFile) -> FileView {
        FileView {
            name: file.name().to_string(),
            size_mb: format!("{:.2}", file.size() as f64 / 1024.0 / 1024.0),
            kind: file.subtype().to_uppercase(),
        }
    }
}

fn percent_or_placeholder(ratio: Option<f64>) -> String {
    ratio
        .map(|r| format!("{:.1}%", r * 100.0))
        .unwrap_or_else(|| PLACEHOLDER.to_string())
}
