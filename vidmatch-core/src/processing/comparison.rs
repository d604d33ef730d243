// ============================================================================
// vidmatch-core/src/processing/comparison.rs
// ============================================================================
//
// PAIRWISE COMPARISON: Similarity Scores for Every Pair of Videos
//
// A run has two phases. Phase one fingerprints every input video (keyframe
// histograms) and accounts for the first half of the progress range. Phase
// two scores every unordered pair of inputs and accounts for the second
// half.
//
// The score of a pair (A, B) pools two directed nearest-neighbour searches:
// for each fingerprint of A the minimum Bhattacharyya distance to any
// fingerprint of B, and the same from B to A. The score is the plain mean
// of the pooled minima. Lower means more similar; 0 is identical. A pair
// with no fingerprints on either side has no score.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Serialize;

use crate::cancellation::CancellationToken;
use crate::config::CompareConfig;
use crate::error::CoreResult;
use crate::external::VideoOpener;
use crate::processing::fingerprint::extract_keyframe_histograms;
use crate::processing::histogram::Fingerprint;
use crate::reporting::{Reporter, RunStartInfo};
use crate::utils::display_name;

/// Similarity score of a pair of videos.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PairScore {
    /// Neither direction produced a finite distance (no fingerprints).
    NoScore,
    /// Mean of the pooled nearest-neighbour distances, in `[0, 1]`.
    Score(f64),
}

impl PairScore {
    pub fn value(&self) -> Option<f64> {
        match self {
            PairScore::NoScore => None,
            PairScore::Score(score) => Some(*score),
        }
    }

    /// Whether this pair counts as a duplicate candidate at `threshold`.
    pub fn is_candidate(&self, threshold: f64) -> bool {
        self.value().is_some_and(|score| score <= threshold)
    }
}

/// One scored pair. `left` precedes `right` in the input order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairResult {
    pub left: PathBuf,
    pub right: PathBuf,
    pub score: PairScore,
}

/// Scores of a comparison run, in pair order.
///
/// Only pairs whose two paths both existed appear. A pair key seen twice
/// (an input path listed more than once) keeps its first position and the
/// latest score.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonResults {
    pairs: Vec<PairResult>,
    #[serde(skip)]
    index: HashMap<(PathBuf, PathBuf), usize>,
    cancelled: bool,
}

impl ComparisonResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, left: PathBuf, right: PathBuf, score: PairScore) {
        let key = (left.clone(), right.clone());
        match self.index.get(&key) {
            Some(&position) => self.pairs[position].score = score,
            None => {
                self.index.insert(key, self.pairs.len());
                self.pairs.push(PairResult { left, right, score });
            }
        }
    }

    /// Looks up a pair by its ordered key.
    pub fn get(&self, left: &Path, right: &Path) -> Option<PairScore> {
        self.index
            .get(&(left.to_path_buf(), right.to_path_buf()))
            .map(|&position| self.pairs[position].score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PairResult> {
        self.pairs.iter()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs with a score.
    pub fn scored_count(&self) -> usize {
        self.pairs
            .iter()
            .filter(|pair| pair.score.value().is_some())
            .count()
    }

    /// Pairs scoring at or below `threshold`, most similar first.
    pub fn candidates(&self, threshold: f64) -> Vec<(&PairResult, f64)> {
        let mut candidates: Vec<_> = self
            .pairs
            .iter()
            .filter_map(|pair| {
                pair.score
                    .value()
                    .filter(|&score| score <= threshold)
                    .map(|score| (pair, score))
            })
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
        candidates
    }

    /// Whether the run stopped early. A cancelled run holds the pairs
    /// finished before cancellation.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.cancelled = true;
    }
}

impl<'a> IntoIterator for &'a ComparisonResults {
    type Item = &'a PairResult;
    type IntoIter = std::slice::Iter<'a, PairResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

/// For each fingerprint in `from`, the minimum distance to any fingerprint
/// in `to`. Empty when `to` is empty, since no finite minimum exists.
pub fn directed_minima(from: &[Fingerprint], to: &[Fingerprint]) -> Vec<f64> {
    if to.is_empty() {
        return Vec::new();
    }
    from.par_iter()
        .map(|a| {
            to.iter()
                .map(|b| a.bhattacharyya(b))
                .fold(f64::INFINITY, f64::min)
        })
        .collect()
}

/// Scores two fingerprint sequences.
///
/// Pools the minima of both directions and averages them. The mean is not
/// weighted per direction, so when one side has many more keyframes its
/// direction dominates the score.
pub fn pair_score(a: &[Fingerprint], b: &[Fingerprint]) -> PairScore {
    let mut minima = directed_minima(a, b);
    minima.extend(directed_minima(b, a));

    if minima.is_empty() {
        PairScore::NoScore
    } else {
        PairScore::Score(minima.iter().sum::<f64>() / minima.len() as f64)
    }
}

/// Number of unordered pairs of `n` inputs.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}

/// Compares every pair of `paths` and returns their scores.
///
/// Paths that do not exist are reported through [`Reporter::warning`] and
/// left out of the results. Existing paths that cannot be decoded have no
/// fingerprints, so all their pairs get [`PairScore::NoScore`]. A path
/// listed twice is decoded once and paired with itself.
///
/// Progress runs from 0 to 0.5 over the fingerprinting phase and from 0.5
/// to 1.0 over the pairs; a completed run always ends with exactly 1.0.
/// Cancellation is checked between frames and between pairs; a cancelled
/// run returns the pairs scored so far and never reports 1.0.
///
/// Fails only when `config` is invalid.
pub fn compare_videos<O: VideoOpener>(
    opener: &O,
    paths: &[PathBuf],
    config: &CompareConfig,
    reporter: &dyn Reporter,
    cancel: &CancellationToken,
) -> CoreResult<ComparisonResults> {
    config.validate()?;

    let total = paths.len();
    let total_pairs = pair_count(total);
    reporter.comparison_started(&RunStartInfo {
        total_videos: total,
        total_pairs,
    });
    log::info!("Comparing {total} videos ({total_pairs} pairs)");

    let mut results = ComparisonResults::new();
    let fingerprints = fingerprint_all(opener, paths, config, reporter, cancel);

    if cancel.is_cancelled() {
        log::info!("Comparison cancelled during fingerprinting");
        results.mark_cancelled();
        return Ok(results);
    }

    let mut pair_index = 0usize;
    for (i, left) in paths.iter().enumerate() {
        for right in &paths[i + 1..] {
            if cancel.is_cancelled() {
                log::info!("Comparison cancelled after {pair_index} of {total_pairs} pairs");
                results.mark_cancelled();
                return Ok(results);
            }
            pair_index += 1;

            if let (Some(a), Some(b)) = (fingerprints.get(left), fingerprints.get(right)) {
                reporter.status(&format!(
                    "Comparing '{}' with '{}' ({pair_index}/{total_pairs})",
                    display_name(left),
                    display_name(right)
                ));
                let score = pair_score(a, b);
                log::debug!(
                    "Score {} vs {}: {:?}",
                    left.display(),
                    right.display(),
                    score
                );
                results.insert(left.clone(), right.clone(), score);
            }

            reporter.progress(0.5 + pair_index as f64 / total_pairs as f64 * 0.5);
        }
    }

    reporter.progress(1.0);
    log::info!(
        "Comparison finished: {} pairs, {} scored",
        results.len(),
        results.scored_count()
    );
    Ok(results)
}

/// Phase one: fingerprints of every existing input, keyed by path.
fn fingerprint_all<O: VideoOpener>(
    opener: &O,
    paths: &[PathBuf],
    config: &CompareConfig,
    reporter: &dyn Reporter,
    cancel: &CancellationToken,
) -> HashMap<PathBuf, Vec<Fingerprint>> {
    let total = paths.len();
    let mut fingerprints: HashMap<PathBuf, Vec<Fingerprint>> = HashMap::new();

    for (i, path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }

        let base = i as f64 / total as f64 * 0.5;
        let done = (i + 1) as f64 / total as f64 * 0.5;

        if !opener.exists(path) {
            log::warn!("Video not found: {}", path.display());
            reporter.warning(&format!("Video not found: {}", path.display()));
            reporter.progress(done);
            continue;
        }

        if fingerprints.contains_key(path) {
            log::debug!("Reusing fingerprints for repeated path {}", path.display());
            reporter.progress(done);
            continue;
        }

        reporter.status(&format!(
            "Analyzing video {}/{total}: {}",
            i + 1,
            display_name(path)
        ));

        let extracted = extract_keyframe_histograms(
            opener,
            path,
            config,
            cancel,
            &mut |fraction| reporter.progress(base + fraction / total as f64 * 0.5),
        );

        if cancel.is_cancelled() {
            break;
        }

        reporter.status(&format!("Keyframes extracted: {}", extracted.len()));
        fingerprints.insert(path.clone(), extracted);
    }

    fingerprints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(bins: &[f32]) -> Fingerprint {
        Fingerprint::from_bins(bins.to_vec())
    }

    #[test]
    fn test_directed_minima() {
        let a = vec![fp(&[1.0, 0.0]), fp(&[0.0, 1.0])];
        let b = vec![fp(&[1.0, 0.0])];

        let minima = directed_minima(&a, &b);
        assert_eq!(minima.len(), 2);
        assert!(minima[0] < 1e-6);
        assert!((minima[1] - 1.0).abs() < 1e-12);

        assert!(directed_minima(&a, &[]).is_empty());
        assert!(directed_minima(&[], &b).is_empty());
    }

    #[test]
    fn test_pair_score_pools_both_directions() {
        let a = vec![fp(&[1.0, 0.0]), fp(&[0.0, 1.0])];
        let b = vec![fp(&[1.0, 0.0])];
        // a->b: [0, 1], b->a: [0]; pooled mean = 1/3
        let score = pair_score(&a, &b).value().unwrap();
        assert!((score - 1.0 / 3.0).abs() < 1e-6);
        assert_eq!(pair_score(&a, &b), pair_score(&b, &a));
    }

    #[test]
    fn test_pair_score_without_fingerprints() {
        let a = vec![fp(&[1.0, 0.0])];
        assert_eq!(pair_score(&a, &[]), PairScore::NoScore);
        assert_eq!(pair_score(&[], &a), PairScore::NoScore);
        assert_eq!(pair_score(&[], &[]), PairScore::NoScore);
    }

    #[test]
    fn test_pair_count() {
        assert_eq!(pair_count(0), 0);
        assert_eq!(pair_count(1), 0);
        assert_eq!(pair_count(2), 1);
        assert_eq!(pair_count(5), 10);
    }

    #[test]
    fn test_results_insert_and_candidates() {
        let mut results = ComparisonResults::new();
        results.insert("a".into(), "b".into(), PairScore::Score(0.4));
        results.insert("a".into(), "c".into(), PairScore::Score(0.1));
        results.insert("b".into(), "c".into(), PairScore::NoScore);
        results.insert("a".into(), "b".into(), PairScore::Score(0.3));

        assert_eq!(results.len(), 3);
        assert_eq!(results.scored_count(), 2);
        assert_eq!(
            results.get(Path::new("a"), Path::new("b")),
            Some(PairScore::Score(0.3))
        );
        assert_eq!(results.get(Path::new("b"), Path::new("a")), None);

        let order: Vec<_> = results.iter().map(|p| p.right.clone()).collect();
        assert_eq!(order, vec![PathBuf::from("b"), PathBuf::from("c"), PathBuf::from("c")]);

        let candidates = results.candidates(0.3);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].1, 0.1);
        assert_eq!(candidates[1].1, 0.3);
        assert!(results.candidates(0.05).is_empty());
    }

    #[test]
    fn test_results_serialize() {
        let mut results = ComparisonResults::new();
        results.insert("a.mp4".into(), "b.mp4".into(), PairScore::Score(0.5));
        results.insert("a.mp4".into(), "c.mp4".into(), PairScore::NoScore);

        let value = serde_json::to_value(&results).unwrap();
        assert_eq!(value["pairs"][0]["score"], 0.5);
        assert!(value["pairs"][1]["score"].is_null());
        assert_eq!(value["cancelled"], false);
    }
}
