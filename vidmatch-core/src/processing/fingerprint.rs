//! Per-video fingerprint extraction.
//!
//! Opens a video, walks its keyframes and turns each one into a histogram
//! [`Fingerprint`]. Extraction is fail-soft: a video that cannot be opened
//! yields no fingerprints, and a decode error mid-stream keeps whatever was
//! extracted up to that point.

use std::path::Path;

use crate::cancellation::CancellationToken;
use crate::config::CompareConfig;
use crate::external::{VideoHandle, VideoOpener};
use crate::processing::histogram::Fingerprint;
use crate::processing::keyframes::Keyframes;

/// Extracts the keyframe fingerprints of the video at `path`, in keyframe
/// order.
///
/// `on_progress` receives this video's progress in `[0, 1]` after every
/// decoded frame: `decoded / frame_count` when the frame count is known,
/// capped at 1. It receives 1.0 once the stream ends, unless the run was
/// cancelled.
pub fn extract_keyframe_histograms<O: VideoOpener>(
    opener: &O,
    path: &Path,
    config: &CompareConfig,
    cancel: &CancellationToken,
    on_progress: &mut dyn FnMut(f64),
) -> Vec<Fingerprint> {
    let mut handle = match opener.open(path) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("Could not open {}: {e}", path.display());
            return Vec::new();
        }
    };

    let frame_count = handle.info().frame_count.filter(|&n| n > 0);
    log::debug!(
        "Extracting keyframes from {} (frames: {})",
        path.display(),
        frame_count.map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );

    let mut report_frame = |decoded: u64| {
        if let Some(total) = frame_count {
            on_progress((decoded as f64 / total as f64).min(1.0));
        }
    };

    let spec = &config.histogram;
    let fingerprints: Vec<Fingerprint> = Keyframes::new(&mut handle, config.diff_threshold)
        .with_cancellation(cancel)
        .on_frame(&mut report_frame)
        .map(|frame| Fingerprint::from_frame(&frame, spec))
        .collect();

    if !cancel.is_cancelled() {
        on_progress(1.0);
    }

    log::debug!(
        "Extracted {} keyframe fingerprints from {}",
        fingerprints.len(),
        path.display()
    );
    fingerprints
}
