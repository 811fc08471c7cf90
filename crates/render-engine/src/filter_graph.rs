//! Filter graph and argument construction for the watermark encode.

use std::path::Path;

use fastmark_common::error::{FastmarkError, FastmarkResult};
use fastmark_job_model::{Placement, SizeLevel, TimeWindow};

use crate::codec::VideoEncoder;

pub const PIXEL_FORMAT: &str = "yuv420p";
pub const AUDIO_CODEC: &str = "aac";
pub const AUDIO_BITRATE: &str = "192k";

/// Label of the composited video stream inside the graph.
pub const VIDEO_OUT_LABEL: &str = "vout";

/// Target overlay box derived from the video size and the size level.
///
/// Only `width` reaches the engine; the overlay's own aspect ratio
/// decides its real height. `height` is the upper bound for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlaySize {
    pub width: u32,
    pub height: u32,
}

impl OverlaySize {
    pub fn for_video(video_width: u32, video_height: u32, level: SizeLevel) -> Self {
        Self {
            width: level.scale(video_width).max(1),
            height: level.scale(video_height).max(1),
        }
    }
}

/// Overlay input `1` onto video input `0`.
///
/// With a limited window the overlay is shifted to start at the window
/// start, trimmed to the window length, and only enabled while
/// `start <= t < start + duration`.
pub fn build_filter_graph(placement: &Placement, overlay: OverlaySize, window: &TimeWindow) -> String {
    let mut watermark_chain = format!("[1:v]scale={}:-1", overlay.width);
    let mut overlay_opts = format!("x={}:y={}", placement.x, placement.y);

    if let (Some(duration), Some(end)) = (window.duration_secs, window.end_secs()) {
        let start = window.start_secs;
        watermark_chain.push_str(&format!(
            ",setpts=PTS-STARTPTS+{start}/TB,trim=start={start}:duration={duration}"
        ));
        overlay_opts.push_str(&format!(":enable='gte(t,{start})*lt(t,{end})'"));
    }

    format!("{watermark_chain}[wm];[0:v][wm]overlay={overlay_opts}[{VIDEO_OUT_LABEL}]")
}

/// Codec arguments for the output.
pub fn encode_args(encoder: VideoEncoder, has_audio: bool) -> Vec<String> {
    let mut args = vec![
        "-c:v".to_string(),
        encoder.as_str().to_string(),
        "-pix_fmt".to_string(),
        PIXEL_FORMAT.to_string(),
    ];
    if has_audio {
        args.extend([
            "-c:a".to_string(),
            AUDIO_CODEC.to_string(),
            "-b:a".to_string(),
            AUDIO_BITRATE.to_string(),
        ]);
    }
    args
}

/// Path as an engine argument. Non-UTF-8 paths are rejected rather than
/// rewritten lossily.
fn path_arg(path: &Path) -> FastmarkResult<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        FastmarkError::validation(format!(
            "Path is not valid UTF-8: {}",
            path.display()
        ))
    })
}

/// Full engine argument list, overwriting `output`.
pub fn build_ffmpeg_args(
    video: &Path,
    watermark: &Path,
    output: &Path,
    filter_graph: &str,
    encoder: VideoEncoder,
    has_audio: bool,
) -> FastmarkResult<Vec<String>> {
    let mut args = vec![
        "-hide_banner".to_string(),
        "-y".to_string(),
        "-i".to_string(),
        path_arg(video)?,
        "-i".to_string(),
        path_arg(watermark)?,
        "-filter_complex".to_string(),
        filter_graph.to_string(),
        "-map".to_string(),
        format!("[{VIDEO_OUT_LABEL}]"),
    ];
    if has_audio {
        args.extend(["-map".to_string(), "0:a".to_string()]);
    }
    args.extend(encode_args(encoder, has_audio));
    args.extend([
        "-progress".to_string(),
        "pipe:1".to_string(),
        "-nostats".to_string(),
        path_arg(output)?,
    ]);
    Ok(args)
}
