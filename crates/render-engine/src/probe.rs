//! Stream metadata of the source video.

use std::path::Path;

use fastmark_common::error::{FastmarkError, FastmarkResult};
use serde::{Deserialize, Serialize};

/// Subset of `ffprobe -print_format json -show_streams -show_format` output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeOutput {
    #[serde(default)]
    pub streams: Vec<ProbeStream>,
    pub format: Option<ProbeFormat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeStream {
    pub codec_type: Option<String>,
    pub codec_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeFormat {
    pub format_name: Option<String>,
    pub duration: Option<String>,
}

/// Facts about the source needed to build the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub width: u32,
    pub height: u32,
    pub has_audio: bool,
    pub video_codec: Option<String>,
    pub duration_secs: Option<f64>,
}

impl ProbeOutput {
    pub fn from_json(bytes: &[u8]) -> FastmarkResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| FastmarkError::probe(format!("Failed to parse ffprobe output: {e}")))
    }
}

impl MediaInfo {
    /// Pick the first video stream and note whether any audio stream exists.
    pub fn from_probe(path: &Path, probe: &ProbeOutput) -> FastmarkResult<Self> {
        let video = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| FastmarkError::NoVideoStream {
                path: path.to_path_buf(),
            })?;

        let (width, height) = match (video.width, video.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(FastmarkError::probe(format!(
                    "Video stream in {} has no dimensions",
                    path.display()
                )))
            }
        };

        let has_audio = probe
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"));

        let duration_secs = probe
            .format
            .as_ref()
            .and_then(|f| parse_duration(f.duration.as_deref()))
            .or_else(|| parse_duration(video.duration.as_deref()));

        Ok(Self {
            width,
            height,
            has_audio,
            video_codec: video.codec_name.clone(),
            duration_secs,
        })
    }
}

fn parse_duration(raw: Option<&str>) -> Option<f64> {
    raw?.parse::<f64>().ok().filter(|d| d.is_finite() && *d > 0.0)
}
