use colored::Colorize;
use markup_tree::{MergeError, MergeStats};
use serde::Serialize;

/// Outcome of checking whether two trees can be merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub mergeable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub matched: usize,
    pub imported_left: usize,
    pub imported_right: usize,
}

impl CheckReport {
    pub fn from_outcome(outcome: Result<MergeStats, &MergeError>) -> Self {
        match outcome {
            Ok(stats) => Self {
                mergeable: true,
                reason: None,
                matched: stats.matched,
                imported_left: stats.imported_left,
                imported_right: stats.imported_right,
            },
            Err(err) => Self {
                mergeable: false,
                reason: Some(err.to_string()),
                matched: 0,
                imported_left: 0,
                imported_right: 0,
            },
        }
    }
}

/// Render merge counters as a single summary line.
pub fn render_stats(stats: &MergeStats) -> String {
    format!(
        "matched={} imported_left={} imported_right={}",
        stats.matched, stats.imported_left, stats.imported_right
    )
    .cyan()
    .to_string()
}

/// Render a check report for terminal output.
pub fn render_check(report: &CheckReport) -> String {
    if report.mergeable {
        format!(
            "{} matched={} imported_left={} imported_right={}",
            "mergeable=true".green(),
            report.matched,
            report.imported_left,
            report.imported_right
        )
    } else {
        format!(
            "{} reason={}",
            "mergeable=false".red(),
            report.reason.as_deref().unwrap_or("unknown")
        )
    }
}
