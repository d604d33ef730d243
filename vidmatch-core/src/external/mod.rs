// ============================================================================
// vidmatch-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Video Decoding and Probing Seams
//
// This module encapsulates everything that touches ffmpeg and ffprobe. The
// comparison pipeline only sees the VideoOpener / VideoHandle traits, so a
// run can be driven by the ffmpeg-sidecar decoder in production and by an
// in-memory frame source in tests.
//
// KEY COMPONENTS:
// - VideoOpener / VideoHandle: open a path, read frames one at a time
// - SidecarOpener: decodes through an ffmpeg child process (rgb24 rawvideo)
// - MemoryOpener: serves pre-built frames from memory
// - ffprobe_executor: stream metadata and per-file details
// - check_dependency: verifies ffmpeg/ffprobe are on PATH

use crate::error::{CoreError, CoreResult};
use crate::media::VideoInfo;

use image::RgbImage;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Frame decoding through an ffmpeg child process
pub mod ffmpeg_decoder;

/// Stream metadata extraction through ffprobe
pub mod ffprobe_executor;

/// In-memory frame source
pub mod memory;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use ffmpeg_decoder::{SidecarOpener, SidecarVideo};
pub use ffprobe_executor::probe_video_details;
pub use memory::{MemoryOpener, MemoryVideo, MemoryVideoHandle};

// ============================================================================
// DECODING TRAITS
// ============================================================================

/// An opened video that yields decoded frames in presentation order.
pub trait VideoHandle {
    /// Stream facts known at open time.
    fn info(&self) -> &VideoInfo;

    /// Reads the next frame as 8-bit RGB.
    ///
    /// `Ok(None)` is the normal end of stream. An `Err` means decoding broke
    /// off; callers treat it as end of stream as well.
    fn next_frame(&mut self) -> CoreResult<Option<RgbImage>>;
}

/// Opens videos for frame-by-frame decoding.
///
/// Implementations must be shareable with the background worker, hence the
/// `Send + Sync` bound. Handles are only used on the thread that opened them.
pub trait VideoOpener: Send + Sync {
    type Handle: VideoHandle;

    /// Whether `path` names an existing input. Paths for which this returns
    /// false are skipped with a warning and never appear in results.
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    /// Opens `path` for decoding. Fails when the file is not a readable video.
    fn open(&self, path: &Path) -> CoreResult<Self::Handle>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name -version` with output discarded. A missing binary maps to
/// [`CoreError::DependencyNotFound`]; any other spawn failure maps to
/// [`CoreError::CommandStart`].
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {cmd_name}");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::warn!("Dependency '{cmd_name}' not found.");
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::error!("Failed to start dependency check command '{cmd_name}': {e}");
            Err(CoreError::CommandStart(cmd_name.to_string(), e))
        }
    }
}

/// Checks for both ffmpeg and ffprobe.
pub fn check_ffmpeg_tools() -> CoreResult<()> {
    check_dependency("ffprobe")?;
    check_dependency("ffmpeg")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_dependency() {
        let result = check_dependency("vidmatch-surely-not-a-real-binary");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }
}
