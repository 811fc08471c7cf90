//! External tool resolution for ffmpeg/ffprobe.
//!
//! Resolution order:
//! 1) Path from the config file
//! 2) Environment variable override (FASTMARK_FFMPEG_PATH, FASTMARK_FFPROBE_PATH)
//! 3) Bare name, resolved through PATH by the OS

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

pub const FFMPEG_ENV: &str = "FASTMARK_FFMPEG_PATH";
pub const FFPROBE_ENV: &str = "FASTMARK_FFPROBE_PATH";

pub(crate) fn resolve_tool(configured: Option<&Path>, env_key: &str, default_name: &str) -> PathBuf {
    if let Some(path) = configured {
        return path.to_path_buf();
    }

    if let Ok(v) = env::var(env_key) {
        let p = PathBuf::from(&v);
        if p.exists() {
            return p;
        }
        tracing::warn!(var = env_key, path = %v, "Ignoring tool override that does not exist");
    }

    let mut filename = default_name.to_string();
    if cfg!(windows) && !filename.to_lowercase().ends_with(".exe") {
        filename.push_str(".exe");
    }
    PathBuf::from(filename)
}

pub fn ffmpeg_path(configured: Option<&Path>) -> PathBuf {
    resolve_tool(configured, FFMPEG_ENV, "ffmpeg")
}

pub fn ffprobe_path(configured: Option<&Path>) -> PathBuf {
    resolve_tool(configured, FFPROBE_ENV, "ffprobe")
}

/// Whether the tool starts and answers `-version`.
pub fn is_tool_available(path: &Path) -> bool {
    Command::new(path)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}
