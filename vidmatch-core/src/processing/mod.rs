//! Core comparison logic.
//!
//! The pipeline runs bottom-up through these submodules: keyframe selection
//! by frame differencing, histogram fingerprints per keyframe, fingerprint
//! extraction per video, and pairwise scoring across all videos.

/// Color histograms and the Bhattacharyya distance
pub mod histogram;

/// Grayscale frame differencing and keyframe selection
pub mod keyframes;

/// Keyframe fingerprints of a single video
pub mod fingerprint;

/// Pairwise scoring of a set of videos
pub mod comparison;

pub use comparison::{
    ComparisonResults, PairResult, PairScore, compare_videos, pair_count, pair_score,
};
pub use fingerprint::extract_keyframe_histograms;
pub use histogram::{ChannelRange, Fingerprint, HistogramSpec};
pub use keyframes::{KeyframeSelector, Keyframes};
