// ============================================================================
// vidmatch-core/src/external/ffmpeg_decoder.rs
// ============================================================================
//
// FFMPEG DECODER: Frame-by-Frame Decoding via ffmpeg-sidecar
//
// SidecarOpener probes the file with ffprobe, then spawns ffmpeg writing
// rgb24 rawvideo to stdout. SidecarVideo pulls OutputFrame events from the
// sidecar iterator one frame at a time, so only the current frame is held
// in memory. Dropping a SidecarVideo before the stream ends kills the child.

use crate::error::{CoreError, CoreResult, command_start_error, command_wait_error};
use crate::external::ffprobe_executor::probe_video_details;
use crate::external::{VideoHandle, VideoOpener};
use crate::media::VideoInfo;

use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::command::FfmpegCommand;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use ffmpeg_sidecar::iter::FfmpegIterator;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// Opens videos by spawning an ffmpeg decode process per file.
#[derive(Debug, Clone, Default)]
pub struct SidecarOpener;

impl SidecarOpener {
    pub fn new() -> Self {
        Self
    }
}

impl VideoOpener for SidecarOpener {
    type Handle = SidecarVideo;

    fn open(&self, path: &Path) -> CoreResult<SidecarVideo> {
        let info = probe_video_details(path)?.stream_info();

        let mut cmd = FfmpegCommand::new();
        cmd.hide_banner();
        cmd.input(path.to_string_lossy().into_owned());
        // Video only; audio, subtitle and data streams are never decoded.
        cmd.args(["-an", "-sn", "-dn"]);
        cmd.rawvideo();

        log::debug!("Spawning ffmpeg frame decoder for {}", path.display());
        let mut child = cmd
            .spawn()
            .map_err(|e| command_start_error("ffmpeg (frame decode)", e))?;

        let events = match child.iter() {
            Ok(events) => events,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(CoreError::Decode(format!(
                    "Failed to read ffmpeg output for {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(SidecarVideo {
            path: path.to_path_buf(),
            info,
            child,
            events,
            state: StreamState::Running,
        })
    }
}

/// Where a decode stream stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    Running,
    /// A decode error ended the stream; ffmpeg may still be running.
    Failed,
    /// The event iterator is exhausted; ffmpeg has closed its output.
    Eof,
}

impl StreamState {
    fn is_done(self) -> bool {
        self != StreamState::Running
    }

    /// Unless the output was drained to the end, the child can be blocked
    /// on a full pipe and would never exit on its own.
    fn needs_kill(self) -> bool {
        self != StreamState::Eof
    }
}

/// A video being decoded by a running ffmpeg child process.
pub struct SidecarVideo {
    path: PathBuf,
    info: VideoInfo,
    child: FfmpegChild,
    events: FfmpegIterator,
    state: StreamState,
}

impl SidecarVideo {
    fn fail(&mut self, message: String) -> CoreError {
        self.state = StreamState::Failed;
        CoreError::Decode(format!("{}: {message}", self.path.display()))
    }
}

impl VideoHandle for SidecarVideo {
    fn info(&self) -> &VideoInfo {
        &self.info
    }

    fn next_frame(&mut self) -> CoreResult<Option<RgbImage>> {
        if self.state.is_done() {
            return Ok(None);
        }

        while let Some(event) = self.events.next() {
            match event {
                FfmpegEvent::OutputFrame(frame) => {
                    let (width, height) = (frame.width, frame.height);
                    return match RgbImage::from_raw(width, height, frame.data) {
                        Some(image) => Ok(Some(image)),
                        None => Err(self.fail(format!(
                            "short frame buffer for {width}x{height} rgb24 frame"
                        ))),
                    };
                }
                FfmpegEvent::Error(message) | FfmpegEvent::Log(LogLevel::Fatal, message) => {
                    return Err(self.fail(message));
                }
                FfmpegEvent::Log(LogLevel::Error, message) => {
                    // Corrupt packets are reported per frame; decoding continues.
                    log::warn!("ffmpeg ({}): {message}", self.path.display());
                }
                _ => {}
            }
        }

        self.state = StreamState::Eof;
        Ok(None)
    }
}

impl Drop for SidecarVideo {
    fn drop(&mut self) {
        if self.state.needs_kill() {
            log::debug!("Stopping ffmpeg decoder for {}", self.path.display());
            let _ = self.child.kill();
        }
        if let Err(e) = self.child.wait() {
            let err = command_wait_error(format!("ffmpeg ({})", self.path.display()), e);
            log::warn!("{err}");
        }
    }
}
