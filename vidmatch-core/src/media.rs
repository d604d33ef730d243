//! Media metadata types.
//!
//! [`VideoInfo`] is the small set of stream facts a [`VideoHandle`](crate::external::VideoHandle)
//! exposes while decoding. [`VideoDetails`] is the fuller per-file report
//! shown next to a duplicate pair during review.

use serde::Serialize;

use crate::utils::format_bytes;

/// Stream facts of an opened video.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    /// Declared or estimated number of frames; None when unknown
    pub frame_count: Option<u64>,
    /// Frames per second; None when unknown
    pub frame_rate: Option<f64>,
}

/// Descriptive information about a video file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VideoDetails {
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub fps: Option<f64>,
    pub frame_count: Option<u64>,
    pub duration_secs: Option<f64>,
    pub codec: Option<String>,
    pub size_bytes: u64,
    /// Approximate bitrate: size * 8 / (duration * 1000), 0 when the
    /// duration is unknown
    pub bitrate_kbps: u64,
    pub size_readable: String,
}

impl VideoDetails {
    /// Fills in the derived fields (duration fallback, frame count estimate,
    /// bitrate, readable size) from the raw probe values.
    pub fn finalize(mut self) -> Self {
        if self.duration_secs.is_none() {
            self.duration_secs = match (self.frame_count, self.fps) {
                (Some(frames), Some(fps)) if fps > 0.0 => Some(frames as f64 / fps),
                _ => None,
            };
        }

        if self.frame_count.is_none() {
            self.frame_count = match (self.duration_secs, self.fps) {
                (Some(duration), Some(fps)) if duration > 0.0 => {
                    Some((duration * fps).round() as u64)
                }
                _ => None,
            };
        }

        self.bitrate_kbps = estimate_bitrate_kbps(self.size_bytes, self.duration_secs);
        self.size_readable = format_bytes(self.size_bytes);
        self
    }

    /// The subset needed while decoding frames.
    pub fn stream_info(&self) -> VideoInfo {
        VideoInfo {
            width: self.width,
            height: self.height,
            frame_count: self.frame_count,
            frame_rate: self.fps,
        }
    }
}

fn estimate_bitrate_kbps(size_bytes: u64, duration_secs: Option<f64>) -> u64 {
    match duration_secs {
        Some(duration) if duration > 0.0 => {
            ((size_bytes as f64 * 8.0) / (duration * 1000.0)) as u64
        }
        _ => 0,
    }
}
