//! ffmpeg/ffprobe-backed media engine.

use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use fastmark_common::config::EngineConfig;
use fastmark_common::error::{FastmarkError, FastmarkResult};

use crate::engine::{EngineJob, MediaEngine, ToolFailure};
use crate::job::{JobControl, JobProgress, JobStage, ProgressCallback, ProgressState};
use crate::probe::ProbeOutput;
use crate::tools;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the system ffmpeg and ffprobe binaries.
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

enum WaitOutcome {
    Exited(ExitStatus),
    Cancelled,
    TimedOut(Duration),
}

impl FfmpegEngine {
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            tools::ffmpeg_path(config.ffmpeg_path.as_deref()),
            tools::ffprobe_path(config.ffprobe_path.as_deref()),
        )
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg
    }

    pub fn ffprobe_path(&self) -> &Path {
        &self.ffprobe
    }

    /// Whether both binaries start.
    pub fn is_available(&self) -> bool {
        tools::is_tool_available(&self.ffmpeg) && tools::is_tool_available(&self.ffprobe)
    }

    fn wait_with_control(
        child: &mut Child,
        control: &JobControl,
        started: Instant,
    ) -> FastmarkResult<WaitOutcome> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(WaitOutcome::Exited(status)),
                Ok(None) => {}
                Err(e) => {
                    stop_child(child);
                    return Err(FastmarkError::execution(format!(
                        "Failed to wait on ffmpeg: {e}"
                    )));
                }
            }

            if control.is_cancelled() {
                tracing::info!(pid = child.id(), "Cancelling ffmpeg job");
                stop_child(child);
                return Ok(WaitOutcome::Cancelled);
            }

            if let Some(limit) = control.timeout() {
                if started.elapsed() >= limit {
                    tracing::warn!(
                        pid = child.id(),
                        timeout_secs = limit.as_secs(),
                        "ffmpeg job exceeded its time limit"
                    );
                    stop_child(child);
                    return Ok(WaitOutcome::TimedOut(limit));
                }
            }

            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

fn stop_child(child: &mut Child) {
    if let Err(err) = child.kill() {
        tracing::warn!(error = %err, "Failed to kill ffmpeg");
    }
    if let Err(err) = child.wait() {
        tracing::warn!(error = %err, "Failed to reap ffmpeg");
    }
}

impl MediaEngine for FfmpegEngine {
    fn list_hwaccels(&self) -> Result<String, ToolFailure> {
        let tool = self.ffmpeg.display().to_string();
        let output = Command::new(&self.ffmpeg)
            .args(["-hide_banner", "-hwaccels"])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ToolFailure::Unavailable {
                tool: tool.clone(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ToolFailure::Failed {
                tool,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn probe(&self, path: &Path) -> FastmarkResult<ProbeOutput> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| FastmarkError::probe(format!("Failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FastmarkError::probe(format!(
                "ffprobe failed on {}: {}",
                path.display(),
                stderr.trim()
            )));
        }

        ProbeOutput::from_json(&output.stdout)
    }

    fn execute(
        &self,
        job: &EngineJob,
        control: &JobControl,
        progress: Option<ProgressCallback>,
    ) -> FastmarkResult<()> {
        if control.is_cancelled() {
            return Err(FastmarkError::Cancelled);
        }

        tracing::debug!(args = ?job.args, "Running ffmpeg");
        let mut child = Command::new(&self.ffmpeg)
            .args(&job.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| FastmarkError::execution(format!("Failed to start ffmpeg: {e}")))?;

        let started = Instant::now();
        tracing::info!(
            pid = child.id(),
            args_len = job.args.len(),
            timeout_secs = control.timeout().map(|t| t.as_secs()),
            "ffmpeg process started"
        );

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| FastmarkError::execution("Failed to capture ffmpeg stdout"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| FastmarkError::execution("Failed to capture ffmpeg stderr"))?;

        // Drain stderr concurrently to avoid ffmpeg blocking on a full stderr pipe.
        let stderr_task = std::thread::spawn(move || -> String {
            let mut reader = BufReader::new(stderr);
            let mut output = String::new();
            match reader.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        let expected = job.expected_duration_secs;
        let progress_task = std::thread::spawn(move || -> Option<ProgressCallback> {
            let reader = BufReader::new(stdout);
            let mut state = ProgressState::default();
            for line in reader.lines() {
                let Ok(line) = line else { break };
                let Some((key, value)) = line.trim().split_once('=') else {
                    continue;
                };
                state.update(key, value);
                if key == "progress" {
                    if let Some(cb) = &progress {
                        cb(state.report(expected, started.elapsed().as_secs_f64()));
                    }
                }
            }
            progress
        });

        let outcome = Self::wait_with_control(&mut child, control, started);

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());
        let progress = progress_task
            .join()
            .map_err(|_| anyhow::anyhow!("ffmpeg progress reader panicked"))?;

        match outcome? {
            WaitOutcome::Exited(status) if status.success() => {
                if let Some(cb) = &progress {
                    cb(JobProgress::stage_only(JobStage::Complete));
                }
                tracing::info!(
                    elapsed_secs = started.elapsed().as_secs_f64(),
                    "ffmpeg finished"
                );
                Ok(())
            }
            WaitOutcome::Exited(status) => Err(FastmarkError::execution(format!(
                "ffmpeg failed ({}): {}",
                status,
                stderr_output.trim()
            ))),
            WaitOutcome::Cancelled => Err(FastmarkError::Cancelled),
            WaitOutcome::TimedOut(after) => Err(FastmarkError::TimedOut { after }),
        }
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn missing_engine() -> FfmpegEngine {
        FfmpegEngine::new(
            "/nonexistent/fastmark/ffmpeg",
            "/nonexistent/fastmark/ffprobe",
        )
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        let failure = missing_engine().list_hwaccels().unwrap_err();
        assert!(matches!(failure, ToolFailure::Unavailable { .. }));
        assert!(!missing_engine().is_available());
    }

    #[test]
    fn test_missing_ffprobe_is_probe_error() {
        let err = missing_engine().probe(Path::new("in.mp4")).unwrap_err();
        assert!(matches!(err, FastmarkError::Probe { .. }));
    }

    #[test]
    fn test_missing_ffmpeg_is_execution_error() {
        let job = EngineJob {
            args: vec!["-version".into()],
            expected_duration_secs: None,
        };
        let err = missing_engine()
            .execute(&job, &JobControl::new(), None)
            .unwrap_err();
        assert!(matches!(err, FastmarkError::Execution { .. }));
    }

    #[test]
    fn test_cancelled_before_start() {
        let control = JobControl::new();
        control.cancel();
        let job = EngineJob {
            args: vec![],
            expected_duration_secs: None,
        };
        let err = missing_engine().execute(&job, &control, None).unwrap_err();
        assert!(matches!(err, FastmarkError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_long_job() {
        // `sh -c "exec sleep 30"` stands in for a slow encode.
        let engine = FfmpegEngine::new("sh", "ffprobe");
        let job = EngineJob {
            args: vec!["-c".into(), "exec sleep 30".into()],
            expected_duration_secs: None,
        };
        let control = JobControl::new().with_timeout(Some(Duration::from_millis(300)));
        let started = Instant::now();
        let err = engine.execute(&job, &control, None).unwrap_err();
        assert!(matches!(err, FastmarkError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_carries_stderr() {
        let engine = FfmpegEngine::new("sh", "ffprobe");
        let job = EngineJob {
            args: vec![
                "-c".into(),
                "echo 'Unknown encoder h264_nvenc' >&2; exit 1".into(),
            ],
            expected_duration_secs: None,
        };
        let err = engine.execute(&job, &JobControl::new(), None).unwrap_err();
        assert!(err.to_string().contains("Unknown encoder h264_nvenc"));
    }

    #[cfg(unix)]
    #[test]
    fn test_progress_lines_reach_callback() {
        use std::sync::{Arc, Mutex};

        let engine = FfmpegEngine::new("sh", "ffprobe");
        let job = EngineJob {
            args: vec![
                "-c".into(),
                "printf 'out_time_us=5000000\\nprogress=continue\\nout_time_us=10000000\\nprogress=end\\n'"
                    .into(),
            ],
            expected_duration_secs: Some(10.0),
        };
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cb: ProgressCallback = Box::new(move |p| sink.lock().unwrap().push(p));

        engine.execute(&job, &JobControl::new(), Some(cb)).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!((seen[0].fraction - 0.5).abs() < 1e-9);
        assert_eq!(seen[1].stage, JobStage::Finalizing);
        assert_eq!(seen[2].stage, JobStage::Complete);
    }
}
