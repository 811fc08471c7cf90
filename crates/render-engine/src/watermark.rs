//! The watermark job: request in, watermarked video out.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use fastmark_common::error::{FastmarkError, FastmarkResult};
use fastmark_job_model::{TimeWindow, WatermarkRequest};

use crate::codec::{select_encoder, VideoEncoder};
use crate::engine::{EngineJob, MediaEngine};
use crate::filter_graph::{build_ffmpeg_args, build_filter_graph, OverlaySize};
use crate::job::{JobControl, JobProgress, JobStage, ProgressCallback};
use crate::probe::MediaInfo;

/// Everything decided before the encode starts.
#[derive(Debug, Clone)]
pub struct WatermarkPlan {
    pub output_path: PathBuf,
    pub media: MediaInfo,
    pub encoder: VideoEncoder,
    pub overlay: OverlaySize,

    /// Window after fitting it to the video length.
    pub window: TimeWindow,

    /// Whether the requested duration ran past the end of the video.
    pub window_clamped: bool,

    pub filter_graph: String,
    pub job: EngineJob,
}

/// Result of a finished job.
#[derive(Debug, Clone)]
pub struct WatermarkOutcome {
    pub output_path: PathBuf,
    pub encoder: VideoEncoder,
    pub media: MediaInfo,
    pub window: TimeWindow,
    pub elapsed: Duration,
}

/// Probe the source, pick an encoder, and build the engine job.
///
/// Stops with an error before encoder selection when the source has no
/// video stream.
pub fn plan_watermark(
    request: &WatermarkRequest,
    engine: &dyn MediaEngine,
) -> FastmarkResult<WatermarkPlan> {
    let placement = request.anchor.placement();
    let output_path = request.output_path();

    for path in [&request.video, &request.watermark] {
        if !path.is_file() {
            return Err(FastmarkError::FileNotFound { path: path.clone() });
        }
    }

    let probe = engine.probe(&request.video)?;
    let media = MediaInfo::from_probe(&request.video, &probe)?;
    tracing::debug!(
        width = media.width,
        height = media.height,
        has_audio = media.has_audio,
        duration_secs = media.duration_secs,
        "Probed source video"
    );

    if !request.window.is_limited() && request.window.start_secs > 0 {
        tracing::debug!(
            start_secs = request.window.start_secs,
            "Start time without duration has no effect; watermarking the full video"
        );
    }
    let (window, window_clamped) = request.window.fit_to(media.duration_secs)?;
    if window_clamped {
        tracing::warn!(
            requested = ?request.window.duration_secs,
            applied = ?window.duration_secs,
            video_secs = media.duration_secs,
            "Watermark window runs past the end of the video; shortening it"
        );
    }

    let encoder = select_encoder(engine);
    let overlay = OverlaySize::for_video(media.width, media.height, request.size);
    let filter_graph = build_filter_graph(&placement, overlay, &window);
    let args = build_ffmpeg_args(
        &request.video,
        &request.watermark,
        &output_path,
        &filter_graph,
        encoder,
        media.has_audio,
    )?;

    Ok(WatermarkPlan {
        output_path,
        job: EngineJob {
            args,
            expected_duration_secs: media.duration_secs,
        },
        media,
        encoder,
        overlay,
        window,
        window_clamped,
        filter_graph,
    })
}

/// Watermark the video described by `request` in one engine run.
///
/// An existing file at the output path is overwritten; asking first is the
/// caller's job. A failed run leaves whatever the engine wrote in place.
pub fn add_watermark(
    request: &WatermarkRequest,
    engine: &dyn MediaEngine,
    control: &JobControl,
    progress: Option<ProgressCallback>,
) -> FastmarkResult<WatermarkOutcome> {
    tracing::info!(
        video = %request.video.display(),
        watermark = %request.watermark.display(),
        anchor = %request.anchor,
        size = %request.size,
        window = %request.window,
        "Starting watermark job"
    );
    let started = Instant::now();

    if let Some(cb) = &progress {
        cb(JobProgress::stage_only(JobStage::Preparing));
    }

    let plan = plan_watermark(request, engine)?;
    tracing::info!(
        output = %plan.output_path.display(),
        encoder = plan.encoder.as_str(),
        overlay_width = plan.overlay.width,
        engine = engine.name(),
        "Watermark plan ready"
    );

    engine.execute(&plan.job, control, progress)?;

    tracing::info!(
        output = %plan.output_path.display(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Watermark job finished"
    );

    Ok(WatermarkOutcome {
        output_path: plan.output_path,
        encoder: plan.encoder,
        media: plan.media,
        window: plan.window,
        elapsed: started.elapsed(),
    })
}
