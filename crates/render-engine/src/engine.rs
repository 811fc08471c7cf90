//! The seam between the compositor and the external media engine.

use std::path::Path;

use fastmark_common::error::FastmarkResult;

use crate::job::{JobControl, ProgressCallback};
use crate::probe::ProbeOutput;

/// Why the capability listing produced no usable text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolFailure {
    /// The binary could not be started (missing, not executable, ...).
    #[error("could not start {tool}: {reason}")]
    Unavailable { tool: String, reason: String },

    /// The binary ran and exited unsuccessfully.
    #[error("{tool} exited with status {}: {stderr}", status_text(.status))]
    Failed {
        tool: String,
        status: Option<i32>,
        stderr: String,
    },
}

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "unknown".to_string(),
    }
}

/// One encode to run.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineJob {
    /// Arguments after the engine binary name.
    pub args: Vec<String>,

    /// Source length, used to turn output time into a progress fraction.
    pub expected_duration_secs: Option<f64>,
}

/// External engine operations the compositor depends on.
pub trait MediaEngine: Send + Sync {
    /// Text of the hardware-acceleration listing.
    fn list_hwaccels(&self) -> Result<String, ToolFailure>;

    /// Stream and container metadata of a file.
    fn probe(&self, path: &Path) -> FastmarkResult<ProbeOutput>;

    /// Run one job to completion, honoring cancellation and timeout.
    ///
    /// A failed run returns `FastmarkError::Execution` carrying the
    /// engine's own diagnostics.
    fn execute(
        &self,
        job: &EngineJob,
        control: &JobControl,
        progress: Option<ProgressCallback>,
    ) -> FastmarkResult<()>;

    /// Engine name.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_failure_messages() {
        let unavailable = ToolFailure::Unavailable {
            tool: "ffmpeg".into(),
            reason: "No such file or directory (os error 2)".into(),
        };
        assert_eq!(
            unavailable.to_string(),
            "could not start ffmpeg: No such file or directory (os error 2)"
        );

        let failed = ToolFailure::Failed {
            tool: "ffmpeg".into(),
            status: None,
            stderr: "killed".into(),
        };
        assert_eq!(
            failed.to_string(),
            "ffmpeg exited with status unknown: killed"
        );
    }
}
