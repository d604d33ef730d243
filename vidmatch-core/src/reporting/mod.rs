//! Progress and status reporting.
//!
//! A comparison run talks to its caller only through the [`Reporter`] trait:
//! overall progress in `[0, 1]`, short human-readable status lines, warnings
//! about skipped inputs, and a final summary. The CLI picks a terminal or a
//! JSON-lines reporter; embedders can use [`CallbackReporter`].

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::processing::comparison::ComparisonResults;
use crate::utils::{display_name, format_duration};

/// Run metadata announced before any work starts.
#[derive(Clone, Debug)]
pub struct RunStartInfo {
    pub total_videos: usize,
    pub total_pairs: usize,
}

/// Outcome of a finished (or cancelled) comparison run.
#[derive(Clone, Debug)]
pub struct ComparisonSummary {
    pub videos: usize,
    pub pairs_scored: usize,
    pub pairs_without_score: usize,
    /// `(left, right, score)` for every pair at or below `threshold`, most
    /// similar first
    pub candidates: Vec<(String, String, f64)>,
    pub threshold: f64,
    pub elapsed: Duration,
    pub cancelled: bool,
}

impl ComparisonSummary {
    pub fn from_results(
        results: &ComparisonResults,
        videos: usize,
        threshold: f64,
        elapsed: Duration,
    ) -> Self {
        let candidates = results
            .candidates(threshold)
            .into_iter()
            .map(|(pair, score)| {
                (
                    display_name(&pair.left),
                    display_name(&pair.right),
                    score,
                )
            })
            .collect();

        let pairs_scored = results.scored_count();
        Self {
            videos,
            pairs_scored,
            pairs_without_score: results.len() - pairs_scored,
            candidates,
            threshold,
            elapsed,
            cancelled: results.is_cancelled(),
        }
    }
}

/// Reporter interface implemented by both human-readable and JSON reporters.
pub trait Reporter: Send + Sync {
    fn comparison_started(&self, _info: &RunStartInfo) {}
    /// Overall run progress in `[0, 1]`, monotonically non-decreasing.
    fn progress(&self, _fraction: f64) {}
    fn status(&self, _message: &str) {}
    fn warning(&self, _message: &str) {}
    fn comparison_complete(&self, _summary: &ComparisonSummary) {}
}

/// No-op reporter that discards all updates.
pub struct NullReporter;

impl Reporter for NullReporter {}

/// Forwards progress and status updates to two closures.
pub struct CallbackReporter<P, S>
where
    P: Fn(f64) + Send + Sync,
    S: Fn(&str) + Send + Sync,
{
    on_progress: P,
    on_status: S,
}

impl<P, S> CallbackReporter<P, S>
where
    P: Fn(f64) + Send + Sync,
    S: Fn(&str) + Send + Sync,
{
    pub fn new(on_progress: P, on_status: S) -> Self {
        Self {
            on_progress,
            on_status,
        }
    }
}

impl<P, S> Reporter for CallbackReporter<P, S>
where
    P: Fn(f64) + Send + Sync,
    S: Fn(&str) + Send + Sync,
{
    fn progress(&self, fraction: f64) {
        (self.on_progress)(fraction);
    }

    fn status(&self, message: &str) {
        (self.on_status)(message);
    }

    fn warning(&self, message: &str) {
        (self.on_status)(message);
    }
}

/// Fans every update out to several reporters, in order.
#[derive(Default)]
pub struct CompositeReporter {
    reporters: Vec<Box<dyn Reporter>>,
}

impl CompositeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }
}

impl Reporter for CompositeReporter {
    fn comparison_started(&self, info: &RunStartInfo) {
        self.reporters.iter().for_each(|r| r.comparison_started(info));
    }

    fn progress(&self, fraction: f64) {
        self.reporters.iter().for_each(|r| r.progress(fraction));
    }

    fn status(&self, message: &str) {
        self.reporters.iter().for_each(|r| r.status(message));
    }

    fn warning(&self, message: &str) {
        self.reporters.iter().for_each(|r| r.warning(message));
    }

    fn comparison_complete(&self, summary: &ComparisonSummary) {
        self.reporters
            .iter()
            .for_each(|r| r.comparison_complete(summary));
    }
}

const BAR_LENGTH: u64 = 1000;

/// Human-friendly reporter with a progress bar.
pub struct TerminalReporter {
    progress: Mutex<Option<ProgressBar>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            progress: Mutex::new(None),
        }
    }

    fn finish_progress(&self) {
        if let Ok(mut guard) = self.progress.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Prints with the bar suspended while one is active, so lines do not
    /// tear it.
    fn print_line(&self, line: String) {
        match self.progress.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(pb) => pb.suspend(|| println!("{line}")),
                None => println!("{line}"),
            },
            Err(_) => println!("{line}"),
        }
    }
}

impl Reporter for TerminalReporter {
    fn comparison_started(&self, info: &RunStartInfo) {
        self.finish_progress();
        println!("\n{}", style("COMPARISON").bold().cyan());
        println!(
            "  {} videos, {} pairs",
            style(info.total_videos).bold(),
            style(info.total_pairs).bold()
        );

        let pb = ProgressBar::new(BAR_LENGTH);
        if let Ok(bar_style) = ProgressStyle::default_bar()
            .template("Comparing [{bar:40}] {percent:>3}% | {elapsed_precise}")
        {
            pb.set_style(bar_style.progress_chars("=> "));
        }
        pb.enable_steady_tick(Duration::from_millis(120));
        if let Ok(mut guard) = self.progress.lock() {
            *guard = Some(pb);
        }
    }

    fn progress(&self, fraction: f64) {
        if let Ok(guard) = self.progress.lock() {
            if let Some(pb) = guard.as_ref() {
                let position = (fraction.clamp(0.0, 1.0) * BAR_LENGTH as f64) as u64;
                if position >= pb.position() {
                    pb.set_position(position);
                }
            }
        }
    }

    fn status(&self, message: &str) {
        self.print_line(format!("  {}{}", style("› ").magenta(), message));
    }

    fn warning(&self, message: &str) {
        self.print_line(format!(
            "{}",
            style(format!("WARN: {message}")).yellow().bold()
        ));
    }

    fn comparison_complete(&self, summary: &ComparisonSummary) {
        self.finish_progress();

        println!("\n{}", style("RESULTS").bold().cyan());
        if summary.cancelled {
            println!("  {}", style("Comparison cancelled; results are partial").yellow());
        }
        println!(
            "  {:<10} {}",
            style("Videos:").bold(),
            summary.videos
        );
        println!(
            "  {:<10} {} scored, {} without score",
            style("Pairs:").bold(),
            summary.pairs_scored,
            summary.pairs_without_score
        );
        println!(
            "  {:<10} {}",
            style("Time:").bold(),
            format_duration(summary.elapsed.as_secs_f64())
        );

        if summary.candidates.is_empty() {
            println!(
                "\n  {}",
                style(format!(
                    "No similar videos found (threshold {:.2})",
                    summary.threshold
                ))
                .dim()
            );
            return;
        }

        println!(
            "\n{}",
            style(format!(
                "POSSIBLE DUPLICATES (score <= {:.2})",
                summary.threshold
            ))
            .bold()
            .cyan()
        );
        for (left, right, score) in &summary.candidates {
            println!(
                "  {} {} <-> {}",
                style(format!("{score:.4}")).green().bold(),
                left,
                right
            );
        }
    }
}

/// JSON-lines reporter for machine consumers.
pub struct JsonReporter {
    writer: Mutex<Box<dyn Write + Send>>,
    last_progress_bucket: Mutex<i32>,
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonReporter {
    pub fn new() -> Self {
        Self::with_writer(Box::new(io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
            last_progress_bucket: Mutex::new(-1),
        }
    }

    fn timestamp() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }

    fn write_value(&self, value: serde_json::Value) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{value}");
            let _ = writer.flush();
        }
    }
}

impl Reporter for JsonReporter {
    fn comparison_started(&self, info: &RunStartInfo) {
        if let Ok(mut bucket) = self.last_progress_bucket.lock() {
            *bucket = -1;
        }
        self.write_value(json!({
            "type": "comparison_started",
            "total_videos": info.total_videos,
            "total_pairs": info.total_pairs,
            "timestamp": Self::timestamp(),
        }));
    }

    fn progress(&self, fraction: f64) {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0) as f32;
        let bucket = (percent as i32) / 5;
        {
            let Ok(mut guard) = self.last_progress_bucket.lock() else {
                return;
            };
            if bucket <= *guard {
                return;
            }
            *guard = bucket;
        }

        self.write_value(json!({
            "type": "progress",
            "percent": percent,
            "timestamp": Self::timestamp(),
        }));
    }

    fn status(&self, message: &str) {
        self.write_value(json!({
            "type": "status",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn warning(&self, message: &str) {
        self.write_value(json!({
            "type": "warning",
            "message": message,
            "timestamp": Self::timestamp(),
        }));
    }

    fn comparison_complete(&self, summary: &ComparisonSummary) {
        let candidates: Vec<_> = summary
            .candidates
            .iter()
            .map(|(left, right, score)| {
                json!({
                    "left": left,
                    "right": right,
                    "score": score,
                })
            })
            .collect();

        self.write_value(json!({
            "type": "comparison_complete",
            "videos": summary.videos,
            "pairs_scored": summary.pairs_scored,
            "pairs_without_score": summary.pairs_without_score,
            "threshold": summary.threshold,
            "candidates": candidates,
            "cancelled": summary.cancelled,
            "duration_seconds": summary.elapsed.as_secs_f64(),
            "timestamp": Self::timestamp(),
        }));
    }
}
