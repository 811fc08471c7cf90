//! Fastmark Render Engine
//!
//! Turns a watermark request into one external ffmpeg run.
//!
//! # Pipeline Architecture
//!
//! ```text
//! request ──┐
//!           ├── file checks
//! ffprobe ──┘        │
//!                    ├── time window fit
//! ffmpeg -hwaccels ──┘        │
//!                             ├── encoder choice (nvenc > qsv > x264)
//!                             │
//! video.mp4 ──┐               ▼
//!             ├── scale ─ trim ─ overlay ─ encode
//! logo.png ───┘                               │
//!                                             ▼
//!                                   video_watermark.mp4
//! ```

pub mod codec;
pub mod engine;
pub mod ffmpeg;
pub mod filter_graph;
pub mod job;
pub mod probe;
pub mod tools;
pub mod watermark;

pub use codec::{HwProbe, VideoEncoder};
pub use engine::{EngineJob, MediaEngine, ToolFailure};
pub use ffmpeg::FfmpegEngine;
pub use job::{JobControl, JobProgress, JobStage, ProgressCallback};
pub use probe::MediaInfo;
pub use watermark::*;
