//! Show what Fastmark sees in a video.

use std::path::PathBuf;

use fastmark_common::config::FastmarkConfig;
use fastmark_job_model::{output_path_for, SizeLevel};
use fastmark_render_engine::filter_graph::OverlaySize;
use fastmark_render_engine::{FfmpegEngine, MediaEngine, MediaInfo};

pub fn run(path: PathBuf, json: bool, config: &FastmarkConfig) -> anyhow::Result<()> {
    let engine = FfmpegEngine::from_config(&config.engine);
    let probe = engine
        .probe(&path)
        .map_err(|e| anyhow::anyhow!("Failed to probe {}: {e}", path.display()))?;
    let media = MediaInfo::from_probe(&path, &probe)?;
    let output = output_path_for(&path);

    let levels = level_widths(&media);

    if json {
        let widths: Vec<_> = levels
            .iter()
            .map(|(size, width)| {
                serde_json::json!({
                    "level": size.get(),
                    "factor": size.factor(),
                    "width": width,
                })
            })
            .collect();
        let report = serde_json::json!({
            "video": path,
            "media": media,
            "widths": widths,
            "output": output,
            "output_exists": output.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Video: {}", path.display());
    println!(
        "  Resolution: {}x{}{}",
        media.width,
        media.height,
        media
            .video_codec
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default()
    );
    match media.duration_secs {
        Some(d) => println!("  Duration: {d:.1}s"),
        None => println!("  Duration: unknown"),
    }
    println!("  Audio: {}", if media.has_audio { "yes" } else { "no" });
    println!();

    println!("Watermark width by size level:");
    for (size, width) in &levels {
        println!("  {size}: {width}px (x{:.3})", size.factor());
    }
    println!();

    println!(
        "Output: {}{}",
        output.display(),
        if output.exists() { " (exists)" } else { "" }
    );

    Ok(())
}

/// Overlay width for every size level, biggest first.
fn level_widths(media: &MediaInfo) -> Vec<(SizeLevel, u32)> {
    (SizeLevel::BIGGEST.get()..=SizeLevel::SMALLEST.get())
        .filter_map(|level| SizeLevel::new(level).ok())
        .map(|size| {
            let overlay = OverlaySize::for_video(media.width, media.height, size);
            (size, overlay.width)
        })
        .collect()
}
