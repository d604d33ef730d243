//! Core library for finding visually similar videos.
//!
//! Each video is reduced to a set of keyframe fingerprints: frames are
//! decoded through ffmpeg, a frame becomes a keyframe when its grayscale
//! content differs enough from the previous keyframe, and every keyframe is
//! summarized as a joint color histogram. Every pair of videos is then
//! scored by the mean nearest-neighbour Bhattacharyya distance between their
//! fingerprints. Lower scores mean more similar videos.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use vidmatch_core::{
//!     CancellationToken, CompareConfig, SidecarOpener, TerminalReporter, compare_videos,
//!     find_video_files,
//! };
//! use std::path::Path;
//!
//! let config = CompareConfig::default();
//! let files = find_video_files(Path::new("/path/to/videos")).unwrap();
//! let results = compare_videos(
//!     &SidecarOpener::new(),
//!     &files,
//!     &config,
//!     &TerminalReporter::new(),
//!     &CancellationToken::new(),
//! )
//! .unwrap();
//!
//! for (pair, score) in results.candidates(config.similarity_threshold) {
//!     println!("{score:.3}  {} <-> {}", pair.left.display(), pair.right.display());
//! }
//! ```
//!
//! For interactive front ends, [`ComparisonService`] runs the same
//! computation on a background thread and streams progress over a channel.

pub mod cancellation;
pub mod config;
pub mod discovery;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod media;
pub mod processing;
pub mod reporting;
pub mod utils;
pub mod worker;

// Re-exports for public API
pub use cancellation::CancellationToken;
pub use config::{CompareConfig, CompareConfigBuilder};
pub use discovery::find_video_files;
pub use error::{CoreError, CoreResult};
pub use external::{
    MemoryOpener, MemoryVideo, SidecarOpener, VideoHandle, VideoOpener, check_dependency,
    check_ffmpeg_tools, probe_video_details,
};
pub use media::{VideoDetails, VideoInfo};
pub use processing::{
    ComparisonResults, Fingerprint, PairResult, PairScore, compare_videos,
    extract_keyframe_histograms,
};
pub use reporting::{
    CallbackReporter, ComparisonSummary, CompositeReporter, JsonReporter, NullReporter, Reporter,
    RunStartInfo, TerminalReporter,
};
pub use utils::{format_bytes, format_duration};
pub use worker::{ComparisonJob, ComparisonService, WorkerEvent};
