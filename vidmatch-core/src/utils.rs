//! Utility functions for formatting and file operations.
//!
//! General-purpose helpers used throughout the vidmatch-core library:
//! byte and duration formatting, display names for paths, frame-rate parsing
//! and video file recognition.

use std::path::Path;

/// File extensions (lowercase) treated as videos by discovery.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mkv"];

/// Checks if the given path is an existing video file with a supported
/// extension (case-insensitive).
#[must_use]
pub fn is_valid_video_file(path: &Path) -> bool {
    path.is_file() && has_video_extension(path)
}

/// Checks only the extension, without touching the file system.
#[must_use]
pub fn has_video_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Formats seconds as HH:MM:SS (e.g., 3725.0 -> "01:02:05"). Returns "??:??:??" for invalid inputs.
#[must_use]
pub fn format_duration(seconds: f64) -> String {
    if seconds < 0.0 || !seconds.is_finite() {
        return "??:??:??".to_string();
    }

    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

/// Formats bytes with appropriate binary units (Bytes, KB, MB, GB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KB", bytes_f64 / KIB)
    } else {
        format!("{bytes} Bytes")
    }
}

/// Short name for status messages: the file name, or the whole path when it
/// has none.
#[must_use]
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Parses an ffprobe rational frame rate ("30000/1001", "25/1", "24").
/// Returns None for zero, negative or malformed rates.
#[must_use]
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num = num.trim().parse::<f64>().ok()?;
            let den = den.trim().parse::<f64>().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse::<f64>().ok()?,
    };

    (value.is_finite() && value > 0.0).then_some(value)
}
