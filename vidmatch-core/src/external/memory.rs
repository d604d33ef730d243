//! In-memory frame source.
//!
//! [`MemoryOpener`] maps paths to pre-built frame sequences. It drives the
//! comparison pipeline without ffmpeg, which is what the test suites and
//! embedders with their own decoder use.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use image::RgbImage;

use crate::error::{CoreError, CoreResult};
use crate::external::{VideoHandle, VideoOpener};
use crate::media::VideoInfo;

/// A registered in-memory video.
#[derive(Debug, Clone, Default)]
pub struct MemoryVideo {
    pub frames: Vec<RgbImage>,
    /// Frame count reported through [`VideoInfo`]; defaults to `frames.len()`
    pub declared_frame_count: Option<u64>,
    /// When set, decoding fails after this many frames
    pub fail_after: Option<usize>,
    /// When true, the handle reports no frame count at all
    pub unknown_frame_count: bool,
    /// When true, the path exists but cannot be opened
    pub unreadable: bool,
}

impl MemoryVideo {
    pub fn new(frames: Vec<RgbImage>) -> Self {
        Self {
            frames,
            ..Default::default()
        }
    }

    /// An existing file that is not a decodable video.
    pub fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Default::default()
        }
    }

    pub fn with_declared_frame_count(mut self, count: Option<u64>) -> Self {
        self.declared_frame_count = count;
        self
    }

    pub fn with_unknown_frame_count(mut self) -> Self {
        self.unknown_frame_count = true;
        self
    }

    pub fn failing_after(mut self, frames: usize) -> Self {
        self.fail_after = Some(frames);
        self
    }
}

/// [`VideoOpener`] over registered in-memory videos.
///
/// Registered paths exist, everything else is missing. Clones share the
/// registry and the open counter.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    videos: Arc<HashMap<PathBuf, MemoryVideo>>,
    opens: Arc<AtomicUsize>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a video. Must be called before the opener is cloned.
    pub fn with_video(mut self, path: impl Into<PathBuf>, video: MemoryVideo) -> Self {
        Arc::make_mut(&mut self.videos).insert(path.into(), video);
        self
    }

    /// Number of successful and failed `open` calls so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl VideoOpener for MemoryOpener {
    type Handle = MemoryVideoHandle;

    fn exists(&self, path: &Path) -> bool {
        self.videos.contains_key(path)
    }

    fn open(&self, path: &Path) -> CoreResult<MemoryVideoHandle> {
        self.opens.fetch_add(1, Ordering::SeqCst);

        let video = self
            .videos
            .get(path)
            .ok_or_else(|| CoreError::PathError(format!("{} does not exist", path.display())))?;

        if video.unreadable {
            return Err(CoreError::VideoInfoError(format!(
                "{} is not a readable video",
                path.display()
            )));
        }

        let (width, height) = video
            .frames
            .first()
            .map(|f| f.dimensions())
            .unwrap_or((0, 0));

        Ok(MemoryVideoHandle {
            info: VideoInfo {
                width,
                height,
                frame_count: if video.unknown_frame_count {
                    None
                } else {
                    video
                        .declared_frame_count
                        .or(Some(video.frames.len() as u64))
                },
                frame_rate: None,
            },
            frames: video.frames.clone().into_iter(),
            fail_after: video.fail_after,
            read: 0,
        })
    }
}

/// Handle returned by [`MemoryOpener`].
#[derive(Debug)]
pub struct MemoryVideoHandle {
    info: VideoInfo,
    frames: std::vec::IntoIter<RgbImage>,
    fail_after: Option<usize>,
    read: usize,
}

impl VideoHandle for MemoryVideoHandle {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CoreResult<Option<RgbImage>> {
        if self.fail_after.is_some_and(|limit| self.read >= limit) {
            return Err(CoreError::Decode(format!(
                "simulated decode failure after {} frames",
                self.read
            )));
        }
        let frame = self.frames.next();
        if frame.is_some() {
            self.read += 1;
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn frames(n: usize) -> Vec<RgbImage> {
        (0..n)
            .map(|i| RgbImage::from_pixel(4, 4, Rgb([i as u8, 0, 0])))
            .collect()
    }

    #[test]
    fn test_registered_paths_exist() {
        let opener = MemoryOpener::new().with_video("a.mp4", MemoryVideo::new(frames(2)));
        assert!(opener.exists(Path::new("a.mp4")));
        assert!(!opener.exists(Path::new("b.mp4")));
    }

    #[test]
    fn test_reads_all_frames() {
        let opener = MemoryOpener::new().with_video("a.mp4", MemoryVideo::new(frames(3)));
        let mut handle = opener.open(Path::new("a.mp4")).unwrap();
        assert_eq!(handle.info().frame_count, Some(3));
        assert_eq!(handle.info().width, 4);

        let mut count = 0;
        while handle.next_frame().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 3);
        assert_eq!(opener.open_count(), 1);
    }

    #[test]
    fn test_unreadable_and_failing() {
        let opener = MemoryOpener::new()
            .with_video("bad.mp4", MemoryVideo::unreadable())
            .with_video("broken.mp4", MemoryVideo::new(frames(5)).failing_after(2));

        assert!(opener.exists(Path::new("bad.mp4")));
        assert!(opener.open(Path::new("bad.mp4")).is_err());

        let mut handle = opener.open(Path::new("broken.mp4")).unwrap();
        assert!(handle.next_frame().unwrap().is_some());
        assert!(handle.next_frame().unwrap().is_some());
        assert!(handle.next_frame().is_err());
    }
}
