//! FFprobe integration for stream metadata.
//!
//! One ffprobe call per file yields both the [`VideoInfo`](crate::media::VideoInfo)
//! used while decoding and the [`VideoDetails`] shown during review.

use crate::error::{CoreError, CoreResult, command_failed_error, command_start_error};
use crate::media::VideoDetails;
use crate::utils::{display_name, parse_frame_rate};

use ffprobe::{FfProbeError, ffprobe};
use std::path::Path;

/// Probes `input_path` and returns its descriptive details.
///
/// Fails when ffprobe cannot run, cannot parse the file, or finds no video
/// stream. The frame count comes from the stream's `nb_frames` when the
/// container declares it, otherwise it is estimated from duration and rate.
pub fn probe_video_details(input_path: &Path) -> CoreResult<VideoDetails> {
    log::debug!(
        "Running ffprobe (via crate) for video details on: {}",
        input_path.display()
    );

    let size_bytes = std::fs::metadata(input_path)?.len();

    let metadata = ffprobe(input_path).map_err(|err| {
        log::warn!("ffprobe failed for {}: {err:?}", input_path.display());
        map_ffprobe_error(err, "video details")
    })?;

    let video_stream = metadata
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| {
            CoreError::VideoInfoError(format!(
                "No video stream found in {}",
                input_path.display()
            ))
        })?;

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);
    if width <= 0 || height <= 0 {
        return Err(CoreError::VideoInfoError(format!(
            "Invalid dimensions found in {}: width={width}, height={height}",
            input_path.display()
        )));
    }

    let fps = parse_frame_rate(&video_stream.avg_frame_rate)
        .or_else(|| parse_frame_rate(&video_stream.r_frame_rate));

    let frame_count = video_stream
        .nb_frames
        .as_deref()
        .and_then(|f| f.parse::<u64>().ok())
        .filter(|&f| f > 0);

    let duration_secs = metadata
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0);

    Ok(VideoDetails {
        filename: display_name(input_path),
        width: width as u32,
        height: height as u32,
        fps,
        frame_count,
        duration_secs,
        codec: video_stream.codec_name.clone(),
        size_bytes,
        ..Default::default()
    }
    .finalize())
}

fn map_ffprobe_error(err: FfProbeError, context: &str) -> CoreError {
    match err {
        FfProbeError::Io(io_err) => command_start_error(format!("ffprobe ({context})"), io_err),
        FfProbeError::Status(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            command_failed_error(format!("ffprobe ({context})"), output.status, stderr)
        }
        FfProbeError::Deserialize(err) => CoreError::JsonParseError(format!(
            "ffprobe {context} output deserialization: {err}"
        )),
        _ => CoreError::FfprobeParse(format!("Unknown ffprobe error during {context}: {err:?}")),
    }
}
