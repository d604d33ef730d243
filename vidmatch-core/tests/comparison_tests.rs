// vidmatch-core/tests/comparison_tests.rs
//
// End-to-end runs of compare_videos over in-memory videos.

use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use vidmatch_core::{
    CancellationToken, CompareConfig, ComparisonResults, CoreError, MemoryOpener, MemoryVideo,
    PairScore, Reporter, compare_videos,
};

// --- Test Helper Functions ---

fn solid(color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(8, 8, Rgb(color))
}

/// A video of `scenes`, each held for a few frames.
fn video(scenes: &[[u8; 3]]) -> MemoryVideo {
    let frames = scenes
        .iter()
        .flat_map(|&color| std::iter::repeat_n(solid(color), 3))
        .collect();
    MemoryVideo::new(frames)
}

const RED: [u8; 3] = [220, 20, 20];
const GREEN: [u8; 3] = [20, 220, 20];
const BLUE: [u8; 3] = [20, 20, 220];
const WHITE: [u8; 3] = [250, 250, 250];

#[derive(Default)]
struct RecordingReporter {
    progress: Mutex<Vec<f64>>,
    statuses: Mutex<Vec<String>>,
    warnings: Mutex<Vec<String>>,
    cancel_on: Option<(String, CancellationToken)>,
}

impl RecordingReporter {
    fn cancelling_on(prefix: &str, token: &CancellationToken) -> Self {
        Self {
            cancel_on: Some((prefix.to_string(), token.clone())),
            ..Default::default()
        }
    }

    fn recorded_progress(&self) -> Vec<f64> {
        self.progress.lock().unwrap().clone()
    }

    fn statuses(&self) -> Vec<String> {
        self.statuses.lock().unwrap().clone()
    }

    fn warnings(&self) -> Vec<String> {
        self.warnings.lock().unwrap().clone()
    }
}

impl Reporter for RecordingReporter {
    fn progress(&self, fraction: f64) {
        self.progress.lock().unwrap().push(fraction);
    }

    fn status(&self, message: &str) {
        if let Some((prefix, token)) = &self.cancel_on {
            if message.starts_with(prefix.as_str()) {
                token.cancel();
            }
        }
        self.statuses.lock().unwrap().push(message.to_string());
    }

    fn warning(&self, message: &str) {
        self.warnings.lock().unwrap().push(message.to_string());
    }
}

fn run(opener: &MemoryOpener, paths: &[&str], reporter: &RecordingReporter) -> ComparisonResults {
    let paths: Vec<PathBuf> = paths.iter().map(PathBuf::from).collect();
    compare_videos(
        opener,
        &paths,
        &CompareConfig::default(),
        reporter,
        &CancellationToken::new(),
    )
    .unwrap()
}

fn score(results: &ComparisonResults, a: &str, b: &str) -> PairScore {
    results
        .get(Path::new(a), Path::new(b))
        .unwrap_or_else(|| panic!("missing pair ({a}, {b})"))
}

// --- Tests ---

#[test]
fn test_identical_videos_score_zero() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED, GREEN, BLUE]))
        .with_video("b.mp4", video(&[RED, GREEN, BLUE]));
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "b.mp4"], &reporter);

    assert_eq!(results.len(), 1);
    let value = score(&results, "a.mp4", "b.mp4").value().unwrap();
    assert!(value < 1e-6, "identical videos scored {value}");
    assert!(!results.is_cancelled());
}

#[test]
fn test_unrelated_videos_score_one() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED, GREEN]))
        .with_video("b.mp4", video(&[BLUE, WHITE]));
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "b.mp4"], &reporter);

    let value = score(&results, "a.mp4", "b.mp4").value().unwrap();
    assert!((value - 1.0).abs() < 1e-9);
    assert!(results.candidates(0.3).is_empty());
}

#[test]
fn test_partial_overlap_pools_both_directions() {
    // a has two scenes, b only the first: a->b minima [0, 1], b->a [0].
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED, GREEN]))
        .with_video("b.mp4", video(&[RED]));
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "b.mp4"], &reporter);

    let value = score(&results, "a.mp4", "b.mp4").value().unwrap();
    assert!((value - 1.0 / 3.0).abs() < 1e-6);
}

#[test]
fn test_every_unordered_pair_in_input_order() {
    let names = ["a.mp4", "b.mp4", "c.mp4", "d.mp4"];
    let mut opener = MemoryOpener::new();
    for (i, name) in names.iter().enumerate() {
        opener = opener.with_video(*name, video(&[[i as u8 * 60, 0, 0]]));
    }
    let reporter = RecordingReporter::default();

    let results = run(&opener, &names, &reporter);

    let pairs: Vec<(String, String)> = results
        .iter()
        .map(|p| (p.left.display().to_string(), p.right.display().to_string()))
        .collect();
    let expected: Vec<(String, String)> = [
        ("a.mp4", "b.mp4"),
        ("a.mp4", "c.mp4"),
        ("a.mp4", "d.mp4"),
        ("b.mp4", "c.mp4"),
        ("b.mp4", "d.mp4"),
        ("c.mp4", "d.mp4"),
    ]
    .iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();
    assert_eq!(pairs, expected);
}

#[test]
fn test_empty_and_single_inputs() {
    let opener = MemoryOpener::new().with_video("a.mp4", video(&[RED]));

    let reporter = RecordingReporter::default();
    let results = run(&opener, &[], &reporter);
    assert!(results.is_empty());
    assert_eq!(reporter.recorded_progress(), vec![1.0]);

    let reporter = RecordingReporter::default();
    let results = run(&opener, &["a.mp4"], &reporter);
    assert!(results.is_empty());
    assert_eq!(reporter.recorded_progress().last(), Some(&1.0));
}

#[test]
fn test_missing_path_is_skipped_with_warning() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED]))
        .with_video("b.mp4", video(&[RED]));
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "gone.mp4", "b.mp4"], &reporter);

    assert_eq!(results.len(), 1);
    assert!(results.get(Path::new("a.mp4"), Path::new("b.mp4")).is_some());
    assert!(results.iter().all(|p| p.left != Path::new("gone.mp4")
        && p.right != Path::new("gone.mp4")));

    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("gone.mp4"));
}

#[test]
fn test_unreadable_video_has_no_score() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED]))
        .with_video("bad.mp4", MemoryVideo::unreadable())
        .with_video("worse.mp4", MemoryVideo::unreadable());
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "bad.mp4", "worse.mp4"], &reporter);

    assert_eq!(results.len(), 3);
    assert_eq!(score(&results, "a.mp4", "bad.mp4"), PairScore::NoScore);
    assert_eq!(score(&results, "bad.mp4", "worse.mp4"), PairScore::NoScore);
    assert_eq!(results.scored_count(), 0);
    assert!(results.candidates(1.0).is_empty());
}

#[test]
fn test_repeated_path_is_decoded_once_and_paired_with_itself() {
    let opener = MemoryOpener::new().with_video("a.mp4", video(&[RED, BLUE]));
    let reporter = RecordingReporter::default();

    let results = run(&opener, &["a.mp4", "a.mp4"], &reporter);

    assert_eq!(opener.open_count(), 1);
    assert_eq!(results.len(), 1);
    let value = score(&results, "a.mp4", "a.mp4").value().unwrap();
    assert!(value < 1e-6);
}

#[test]
fn test_progress_is_monotone_and_completes() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED, GREEN]))
        .with_video("b.mp4", video(&[BLUE]).with_unknown_frame_count())
        .with_video("c.mp4", video(&[WHITE]));
    let reporter = RecordingReporter::default();

    run(&opener, &["a.mp4", "missing.mp4", "b.mp4", "c.mp4"], &reporter);

    let progress = reporter.recorded_progress();
    assert!(!progress.is_empty());
    assert!(progress.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(progress.windows(2).all(|w| w[0] <= w[1] + 1e-12));
    assert_eq!(progress.last(), Some(&1.0));
    assert!(progress.iter().any(|&p| (p - 0.5).abs() < 1e-9));
}

#[test]
fn test_status_messages() {
    let opener = MemoryOpener::new()
        .with_video("/videos/a.mp4", video(&[RED, GREEN]))
        .with_video("/videos/b.mp4", video(&[RED]));
    let reporter = RecordingReporter::default();

    run(&opener, &["/videos/a.mp4", "/videos/b.mp4"], &reporter);

    let statuses = reporter.statuses();
    assert_eq!(
        statuses,
        vec![
            "Analyzing video 1/2: a.mp4".to_string(),
            "Keyframes extracted: 2".to_string(),
            "Analyzing video 2/2: b.mp4".to_string(),
            "Keyframes extracted: 1".to_string(),
            "Comparing 'a.mp4' with 'b.mp4' (1/1)".to_string(),
        ]
    );
}

#[test]
fn test_cancel_between_pairs_returns_partial_results() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED]))
        .with_video("b.mp4", video(&[GREEN]))
        .with_video("c.mp4", video(&[BLUE]));
    let cancel = CancellationToken::new();
    let reporter = RecordingReporter::cancelling_on("Comparing", &cancel);
    let paths: Vec<PathBuf> = ["a.mp4", "b.mp4", "c.mp4"].iter().map(PathBuf::from).collect();

    let results =
        compare_videos(&opener, &paths, &CompareConfig::default(), &reporter, &cancel).unwrap();

    assert!(results.is_cancelled());
    assert_eq!(results.len(), 1);
    assert!(reporter.recorded_progress().iter().all(|&p| p < 1.0));
}

#[test]
fn test_cancel_during_fingerprinting() {
    let opener = MemoryOpener::new()
        .with_video("a.mp4", video(&[RED]))
        .with_video("b.mp4", video(&[GREEN]));
    let cancel = CancellationToken::new();
    let reporter = RecordingReporter::cancelling_on("Analyzing", &cancel);
    let paths: Vec<PathBuf> = ["a.mp4", "b.mp4"].iter().map(PathBuf::from).collect();

    let results =
        compare_videos(&opener, &paths, &CompareConfig::default(), &reporter, &cancel).unwrap();

    assert!(results.is_cancelled());
    assert!(results.is_empty());
    assert_eq!(opener.open_count(), 1);
    assert!(reporter.recorded_progress().iter().all(|&p| p < 1.0));
}

#[test]
fn test_invalid_config_is_rejected() {
    let opener = MemoryOpener::new();
    let config = CompareConfig {
        similarity_threshold: -0.5,
        ..Default::default()
    };
    let result = compare_videos(
        &opener,
        &[],
        &config,
        &RecordingReporter::default(),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(CoreError::Config(_))));
}
