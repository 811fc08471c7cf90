//! Check the media engine and hardware encoders.

use fastmark_common::config::FastmarkConfig;
use fastmark_render_engine::codec::probe_hardware;
use fastmark_render_engine::tools::is_tool_available;
use fastmark_render_engine::{FfmpegEngine, HwProbe};

pub fn run(config: &FastmarkConfig) -> anyhow::Result<()> {
    println!("Fastmark System Check");
    println!("{}", "=".repeat(50));

    let engine = FfmpegEngine::from_config(&config.engine);

    let mut ready = true;
    for (name, path) in [
        ("ffmpeg", engine.ffmpeg_path()),
        ("ffprobe", engine.ffprobe_path()),
    ] {
        if is_tool_available(path) {
            println!("[OK] {name}: {}", path.display());
        } else {
            println!("[MISSING] {name}: {} does not run", path.display());
            ready = false;
        }
    }

    let probe = probe_hardware(&engine);
    match &probe {
        HwProbe::Accelerated(vendor) => {
            println!("[OK] Hardware acceleration: {vendor:?}")
        }
        HwProbe::NoAcceleration => {
            println!("[INFO] Hardware acceleration: none listed")
        }
        HwProbe::ToolUnavailable { reason } => {
            println!("[WARN] Hardware probe could not start ffmpeg: {reason}")
        }
        HwProbe::ToolFailed { status, stderr } => println!(
            "[WARN] Hardware probe failed (status {}): {}",
            status.map_or_else(|| "unknown".to_string(), |c| c.to_string()),
            stderr
        ),
    }
    let encoder = probe.encoder();
    println!(
        "     Video encoder: {encoder} ({})",
        if encoder.is_hardware() { "hardware" } else { "software" }
    );
    if probe.is_tool_error() {
        ready = false;
    }

    match config.engine.job_timeout_secs {
        Some(secs) => println!("     Job timeout: {secs}s"),
        None => println!("     Job timeout: none"),
    }

    println!();
    if ready {
        println!("ffmpeg and ffprobe are available. Fastmark is ready.");
    } else if probe.is_tool_error() && is_tool_available(engine.ffmpeg_path()) {
        println!("ffmpeg runs but cannot list hardware accelerators; check the ffmpeg build.");
    } else {
        println!("Install ffmpeg or set FASTMARK_FFMPEG_PATH / FASTMARK_FFPROBE_PATH.");
    }

    Ok(())
}
