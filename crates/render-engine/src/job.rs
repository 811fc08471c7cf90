//! Job control and progress reporting for one engine run.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Progress callback for a running job.
pub type ProgressCallback = Box<dyn Fn(JobProgress) + Send>;

/// Cancellation flag and deadline attached to one job.
///
/// Clones share the same flag, so a clone handed to a signal handler or UI
/// can stop a job running elsewhere.
#[derive(Debug, Clone, Default)]
pub struct JobControl {
    cancelled: Arc<AtomicBool>,
    timeout: Option<Duration>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask the running job to stop. The engine kills its process.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

/// Progress report for a running job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobProgress {
    /// Current progress [0.0, 1.0]. Stays 0 when the length is unknown.
    pub fraction: f64,

    /// Output timestamp reached so far.
    pub out_time_secs: f64,

    /// Estimated time remaining in seconds.
    pub eta_secs: f64,

    pub stage: JobStage,
}

/// Stages of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Preparing,
    Encoding,
    Finalizing,
    Complete,
}

impl JobProgress {
    pub fn stage_only(stage: JobStage) -> Self {
        Self {
            fraction: if stage == JobStage::Complete { 1.0 } else { 0.0 },
            out_time_secs: 0.0,
            eta_secs: 0.0,
            stage,
        }
    }
}

/// Accumulates `key=value` lines from `ffmpeg -progress`.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub out_time_secs: f64,
    pub complete: bool,
}

impl ProgressState {
    pub fn update(&mut self, key: &str, value: &str) {
        match key {
            // ffmpeg reports microseconds under both names.
            "out_time_ms" | "out_time_us" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
            }
            "progress" => {
                self.complete = value == "end";
            }
            _ => {}
        }
    }

    pub fn report(&self, expected_duration_secs: Option<f64>, elapsed_secs: f64) -> JobProgress {
        let fraction = match expected_duration_secs {
            Some(total) if total > 0.0 => (self.out_time_secs / total).clamp(0.0, 1.0),
            _ => 0.0,
        };

        let eta_secs = if fraction > 0.0 {
            (elapsed_secs / fraction) - elapsed_secs
        } else {
            0.0
        }
        .max(0.0);

        JobProgress {
            fraction: if self.complete { 1.0 } else { fraction },
            out_time_secs: self.out_time_secs,
            eta_secs,
            stage: if self.complete {
                JobStage::Finalizing
            } else {
                JobStage::Encoding
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared_between_clones() {
        let control = JobControl::new();
        let handle = control.clone();
        assert!(!control.is_cancelled());
        handle.cancel();
        assert!(control.is_cancelled());
    }

    #[test]
    fn test_progress_state_parses_out_time() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "2500000");
        state.update("progress", "continue");
        let report = state.report(Some(10.0), 1.0);
        assert!((report.fraction - 0.25).abs() < 1e-9);
        assert!((report.eta_secs - 3.0).abs() < 1e-9);
        assert_eq!(report.stage, JobStage::Encoding);
    }

    #[test]
    fn test_progress_without_length_stays_at_zero() {
        let mut state = ProgressState::default();
        state.update("out_time_ms", "9000000");
        let report = state.report(None, 4.0);
        assert_eq!(report.fraction, 0.0);
        assert!((report.out_time_secs - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_end_marks_finalizing() {
        let mut state = ProgressState::default();
        state.update("progress", "end");
        let report = state.report(Some(10.0), 2.0);
        assert_eq!(report.fraction, 1.0);
        assert_eq!(report.stage, JobStage::Finalizing);
    }

    #[test]
    fn test_ignores_garbage_values() {
        let mut state = ProgressState::default();
        state.update("out_time_us", "N/A");
        state.update("bitrate", "1024kbits/s");
        assert_eq!(state.out_time_secs, 0.0);
    }
}
