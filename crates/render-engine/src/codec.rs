//! Video encoder selection from the engine's hardware-acceleration listing.
//!
//! The probe is a best-effort heuristic: finding a vendor token says the
//! engine was built with that acceleration, not that the encode will work.

use std::fmt;

use crate::engine::{MediaEngine, ToolFailure};

/// Tokens that indicate NVIDIA acceleration. Checked first.
///
/// `cuda` alone is not enough: stock builds list it without an NVIDIA GPU.
const NVIDIA_TOKENS: &[&str] = &["nvenc"];

/// Tokens that indicate Intel Quick Sync acceleration.
const INTEL_TOKENS: &[&str] = &["qsv"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuVendor {
    Nvidia,
    Intel,
}

/// Output video encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoEncoder {
    Nvenc,
    Qsv,
    X264,
}

impl VideoEncoder {
    /// Engine codec identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            VideoEncoder::Nvenc => "h264_nvenc",
            VideoEncoder::Qsv => "h264_qsv",
            VideoEncoder::X264 => "libx264",
        }
    }

    pub fn is_hardware(self) -> bool {
        !matches!(self, VideoEncoder::X264)
    }
}

impl fmt::Display for VideoEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the capability probe found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HwProbe {
    Accelerated(GpuVendor),
    /// The listing ran but named no known vendor.
    NoAcceleration,
    /// The engine could not be started.
    ToolUnavailable { reason: String },
    /// The engine ran and failed.
    ToolFailed { status: Option<i32>, stderr: String },
}

impl HwProbe {
    /// Classify the listing text. NVIDIA takes precedence over Intel.
    pub fn from_listing(listing: &str) -> Self {
        let has_any = |tokens: &[&str]| tokens.iter().any(|t| listing.contains(t));

        if has_any(NVIDIA_TOKENS) {
            HwProbe::Accelerated(GpuVendor::Nvidia)
        } else if has_any(INTEL_TOKENS) {
            HwProbe::Accelerated(GpuVendor::Intel)
        } else {
            HwProbe::NoAcceleration
        }
    }

    pub fn from_failure(failure: ToolFailure) -> Self {
        match failure {
            ToolFailure::Unavailable { reason, .. } => HwProbe::ToolUnavailable { reason },
            ToolFailure::Failed { status, stderr, .. } => HwProbe::ToolFailed { status, stderr },
        }
    }

    /// Encoder to use. Every non-accelerated outcome falls back to software.
    pub fn encoder(&self) -> VideoEncoder {
        match self {
            HwProbe::Accelerated(GpuVendor::Nvidia) => VideoEncoder::Nvenc,
            HwProbe::Accelerated(GpuVendor::Intel) => VideoEncoder::Qsv,
            _ => VideoEncoder::X264,
        }
    }

    pub fn is_tool_error(&self) -> bool {
        matches!(
            self,
            HwProbe::ToolUnavailable { .. } | HwProbe::ToolFailed { .. }
        )
    }
}

/// Run the capability listing and classify it. Never fails.
pub fn probe_hardware(engine: &dyn MediaEngine) -> HwProbe {
    let probe = match engine.list_hwaccels() {
        Ok(listing) => HwProbe::from_listing(&listing),
        Err(failure) => {
            tracing::warn!(
                engine = engine.name(),
                error = %failure,
                "Hardware acceleration probe failed; using software encoder"
            );
            HwProbe::from_failure(failure)
        }
    };

    match &probe {
        HwProbe::Accelerated(vendor) => {
            tracing::debug!(?vendor, "Hardware acceleration detected")
        }
        HwProbe::NoAcceleration => {
            tracing::debug!("No hardware acceleration listed; using software encoder")
        }
        _ => {}
    }
    probe
}

/// Pick the output video encoder.
pub fn select_encoder(engine: &dyn MediaEngine) -> VideoEncoder {
    let encoder = probe_hardware(engine).encoder();
    tracing::info!(encoder = encoder.as_str(), "Selected video encoder");
    encoder
}
