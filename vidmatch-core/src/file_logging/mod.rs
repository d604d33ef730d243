//! File logging for comparison runs.
//!
//! [`setup_file_logging`] installs log4rs as the `log` backend.
//! [`LoggingReporter`] mirrors reporter traffic into that log, throttling
//! progress to 10% milestones so long runs stay readable.

pub mod setup;

pub use setup::{run_log_path, setup_file_logging};

use crate::reporting::{ComparisonSummary, Reporter, RunStartInfo};
use crate::utils::format_duration;
use log::{debug, info, warn};
use std::sync::Mutex;

/// Percent step between logged progress lines.
const PROGRESS_LOG_STEP: u32 = 10;

pub struct LoggingReporter {
    last_logged_percent: Mutex<Option<u32>>,
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggingReporter {
    pub fn new() -> Self {
        Self {
            last_logged_percent: Mutex::new(None),
        }
    }

    /// Returns the milestone to log for `fraction`, if it passes a new one.
    fn milestone(&self, fraction: f64) -> Option<u32> {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0) as u32;
        let milestone = percent - percent % PROGRESS_LOG_STEP;
        let mut last = self.last_logged_percent.lock().ok()?;
        if last.is_some_and(|logged| milestone <= logged) {
            return None;
        }
        *last = Some(milestone);
        Some(milestone)
    }
}

impl Reporter for LoggingReporter {
    fn comparison_started(&self, info: &RunStartInfo) {
        if let Ok(mut last) = self.last_logged_percent.lock() {
            *last = None;
        }
        info!(
            "Starting comparison of {} videos ({} pairs)",
            info.total_videos, info.total_pairs
        );
    }

    fn progress(&self, fraction: f64) {
        if let Some(percent) = self.milestone(fraction) {
            info!("Comparison progress: {percent}%");
        }
    }

    fn status(&self, message: &str) {
        debug!("{message}");
    }

    fn warning(&self, message: &str) {
        warn!("{message}");
    }

    fn comparison_complete(&self, summary: &ComparisonSummary) {
        if summary.cancelled {
            warn!("Comparison cancelled; results are partial");
        }
        info!(
            "Comparison complete: {} videos, {} pairs scored, {} without score, took {}",
            summary.videos,
            summary.pairs_scored,
            summary.pairs_without_score,
            format_duration(summary.elapsed.as_secs_f64())
        );
        info!(
            "{} candidate pairs at threshold {:.2}",
            summary.candidates.len(),
            summary.threshold
        );
        for (left, right, score) in &summary.candidates {
            info!("  {score:.4}  {left} <-> {right}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_milestones() {
        let reporter = LoggingReporter::new();
        assert_eq!(reporter.milestone(0.0), Some(0));
        assert_eq!(reporter.milestone(0.05), None);
        assert_eq!(reporter.milestone(0.12), Some(10));
        assert_eq!(reporter.milestone(0.19), None);
        assert_eq!(reporter.milestone(0.55), Some(50));
        assert_eq!(reporter.milestone(1.0), Some(100));
        assert_eq!(reporter.milestone(1.0), None);
    }
}
