//! The watermark form: raw field text in, status message out.
//!
//! Mirrors a small desktop dialog. Paths, position, optional duration and
//! start time, and a size level are collected; blank paths are refused, an
//! existing output needs confirmation, and every outcome ends up as one
//! line of status text.

use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use fastmark_common::error::{FastmarkError, FastmarkResult};
use fastmark_job_model::{Anchor, SizeLevel, TimeWindow, WatermarkRequest};
use fastmark_render_engine::{
    add_watermark, plan_watermark, JobControl, MediaEngine, ProgressCallback, WatermarkPlan,
};

pub const MISSING_PATHS: &str = "Please select both video and watermark files.";

/// Field values as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct FormFields {
    pub video: String,
    pub watermark: String,
    pub position: String,
    /// Seconds to show the watermark; blank for the full video.
    pub duration: String,
    /// Seconds before the watermark appears; blank for 0.
    pub start_time: String,
    pub size: u8,
}

/// What the status area shows after "apply".
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    /// The form refused to start, with the reason.
    Refused(String),
    /// The user chose to keep an existing output.
    Declined(PathBuf),
    Applied(PathBuf),
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Refused(reason) => f.write_str(reason),
            Status::Declined(path) => write!(f, "Kept existing file: {}", path.display()),
            Status::Applied(path) => write!(
                f,
                "Watermark applied successfully. Output saved as: {}",
                path.display()
            ),
            Status::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Yes/no question to the user.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Answers every question with "yes".
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

/// Asks on stdout and reads the answer from stdin. Anything but y/yes is "no".
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        if write!(self.output, "{question} [y/N] ")
            .and_then(|_| self.output.flush())
            .is_err()
        {
            return false;
        }
        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}

/// Turn optional free text into whole seconds, truncating fractions.
fn parse_seconds(field: &str, text: &str) -> FastmarkResult<Option<u32>> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    match text.parse::<f64>() {
        Ok(secs) if secs.is_finite() && secs >= 0.0 => Ok(Some(secs.trunc() as u32)),
        _ => Err(FastmarkError::validation(format!(
            "{field} must be a non-negative number of seconds, got '{text}'"
        ))),
    }
}

impl FormFields {
    fn to_request(&self) -> FastmarkResult<WatermarkRequest> {
        let anchor: Anchor = self.position.trim().parse()?;
        let size = SizeLevel::new(self.size)?;
        let start = parse_seconds("Start time", &self.start_time)?.unwrap_or(0);
        let duration = parse_seconds("Duration", &self.duration)?;

        Ok(
            WatermarkRequest::new(self.video.trim(), self.watermark.trim())
                .with_anchor(anchor)
                .with_size(size)
                .with_window(TimeWindow::new(start, duration)),
        )
    }
}

/// Validate the fields and settle the overwrite question.
///
/// Touches nothing but the filesystem check for an existing output.
pub fn prepare(fields: &FormFields, confirm: &mut dyn Confirm) -> Result<WatermarkRequest, Status> {
    if fields.video.trim().is_empty() || fields.watermark.trim().is_empty() {
        return Err(Status::Refused(MISSING_PATHS.to_string()));
    }

    let request = fields
        .to_request()
        .map_err(|e| Status::Failed(e.to_string()))?;

    let output = request.output_path();
    if output.exists() {
        let question = format!(
            "The file \"{}\" already exists. Do you want to replace it?",
            output.display()
        );
        if !confirm.confirm(&question) {
            tracing::info!(output = %output.display(), "User kept existing output");
            return Err(Status::Declined(output));
        }
    }

    Ok(request)
}

/// Selection summary shown while the job runs.
pub fn summary(request: &WatermarkRequest) -> String {
    let duration = match request.window.duration_secs {
        Some(d) => d.to_string(),
        None => "full video".to_string(),
    };
    format!(
        "Selected video: {}\nSelected watermark: {}\nPosition: {}\nDuration: {}\nStart Time: {}\nScale Factor: {}",
        request.video.display(),
        request.watermark.display(),
        request.anchor,
        duration,
        request.window.start_secs,
        request.size,
    )
}

/// Plan the job without running it. Failures become status text, as in [`run`].
pub fn plan(
    request: &WatermarkRequest,
    engine: &dyn MediaEngine,
) -> Result<WatermarkPlan, Status> {
    plan_watermark(request, engine).map_err(|e| {
        tracing::error!(error = %e, "Watermark plan failed");
        Status::Failed(e.to_string())
    })
}

/// Run the job and turn its result into status text.
pub fn run(
    request: &WatermarkRequest,
    engine: &dyn MediaEngine,
    control: &JobControl,
    progress: Option<ProgressCallback>,
) -> Status {
    match add_watermark(request, engine, control, progress) {
        Ok(outcome) => Status::Applied(outcome.output_path),
        Err(e) => {
            tracing::error!(error = %e, "Watermark job failed");
            Status::Failed(e.to_string())
        }
    }
}
