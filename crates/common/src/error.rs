//! Error types shared across Fastmark crates.

use std::path::PathBuf;
use std::time::Duration;

/// Top-level error type for Fastmark operations.
#[derive(Debug, thiserror::Error)]
pub enum FastmarkError {
    #[error("{message}")]
    Validation { message: String },

    #[error("No video stream found in {path}")]
    NoVideoStream { path: PathBuf },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("{message}")]
    Execution { message: String },

    #[error("Job cancelled")]
    Cancelled,

    #[error("Job timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FastmarkError.
pub type FastmarkResult<T> = Result<T, FastmarkError>;

impl FastmarkError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error was raised before any external process ran.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_message_is_verbatim() {
        let err = FastmarkError::execution("ffmpeg exited with status 1: Invalid argument");
        assert_eq!(
            err.to_string(),
            "ffmpeg exited with status 1: Invalid argument"
        );
    }

    #[test]
    fn test_timed_out_message() {
        let err = FastmarkError::TimedOut {
            after: Duration::from_secs(90),
        };
        assert_eq!(err.to_string(), "Job timed out after 90s");
    }

    #[test]
    fn test_no_video_stream_names_path() {
        let err = FastmarkError::NoVideoStream {
            path: PathBuf::from("clip.mp3"),
        };
        assert_eq!(err.to_string(), "No video stream found in clip.mp3");
    }
}
