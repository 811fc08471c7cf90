//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FastmarkError, FastmarkResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FastmarkConfig {
    /// External media engine settings.
    pub engine: EngineConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where to find ffmpeg/ffprobe and how long a job may run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Explicit ffmpeg binary. Falls back to `FASTMARK_FFMPEG_PATH`, then `PATH`.
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit ffprobe binary. Falls back to `FASTMARK_FFPROBE_PATH`, then `PATH`.
    pub ffprobe_path: Option<PathBuf>,

    /// Kill the encode after this many seconds. `None` waits forever.
    pub job_timeout_secs: Option<u64>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "fastmark=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl FastmarkConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to an explicit path, creating parent directories.
    pub fn save_to(&self, config_path: &Path) -> FastmarkResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }

    /// Job timeout as a duration, rejecting a zero timeout.
    pub fn job_timeout(&self) -> FastmarkResult<Option<std::time::Duration>> {
        match self.engine.job_timeout_secs {
            Some(0) => Err(FastmarkError::config("job_timeout_secs must be positive")),
            Some(secs) => Ok(Some(std::time::Duration::from_secs(secs))),
            None => Ok(None),
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("fastmark").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FastmarkConfig::load_from(&dir.path().join("absent.json"));
        assert_eq!(config, FastmarkConfig::default());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"engine":{"job_timeout_secs":600}}"#).unwrap();

        let config = FastmarkConfig::load_from(&path);
        assert_eq!(config.engine.job_timeout_secs, Some(600));
        assert!(config.engine.ffmpeg_path.is_none());
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(FastmarkConfig::load_from(&path), FastmarkConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let mut config = FastmarkConfig::default();
        config.engine.ffmpeg_path = Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"));
        config.save_to(&path).unwrap();

        assert_eq!(FastmarkConfig::load_from(&path), config);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = FastmarkConfig::default();
        config.engine.job_timeout_secs = Some(0);
        assert!(config.job_timeout().is_err());

        config.engine.job_timeout_secs = Some(30);
        assert_eq!(
            config.job_timeout().unwrap(),
            Some(std::time::Duration::from_secs(30))
        );
    }
}
