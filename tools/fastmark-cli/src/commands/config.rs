//! Show or initialize the configuration file.

use std::path::{Path, PathBuf};

use fastmark_common::config::FastmarkConfig;

pub fn run(init: bool, path: &Path, config: &FastmarkConfig) -> anyhow::Result<()> {
    if init {
        match init_config(path)? {
            Some(written) => println!("Wrote default config: {}", written.display()),
            None => println!("Config already exists: {}", path.display()),
        }
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Write the defaults to `path` unless a file is already there.
fn init_config(path: &Path) -> anyhow::Result<Option<PathBuf>> {
    if path.exists() {
        return Ok(None);
    }
    FastmarkConfig::default().save_to(path)?;
    Ok(Some(path.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom").join("fastmark.json");

        assert_eq!(init_config(&path).unwrap(), Some(path.clone()));
        assert!(path.exists());

        let loaded = FastmarkConfig::load_from(&path);
        assert_eq!(loaded.logging.level, "info");
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fastmark.json");
        std::fs::write(&path, r#"{"logging":{"level":"warn"}}"#).unwrap();

        assert_eq!(init_config(&path).unwrap(), None);
        assert_eq!(FastmarkConfig::load_from(&path).logging.level, "warn");
    }
}
