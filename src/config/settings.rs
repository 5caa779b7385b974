//! Application settings and paths.
//!
//! Settings provide the defaults for every CLI flag. They are read from
//! `settings.json` in the XDG config directory, or from an explicit file.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/tcpsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform configuration directory.
    pub fn new() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "tcpsweep", "tcpsweep")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Scan defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Default concurrency level.
    pub concurrency: usize,
    /// Default timeout in milliseconds.
    pub timeout_ms: u64,
    /// Default first port.
    pub start_port: u16,
    /// Default last port.
    pub end_port: u16,
    /// Grab banners by default.
    pub banner: bool,
    /// Default output format.
    pub output: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: 100,
            timeout_ms: 750,
            start_port: 1,
            end_port: 1024,
            banner: false,
            output: "plain".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults when
    /// no settings file exists.
    pub fn load() -> ConfigResult<Self> {
        let file = Paths::new()?.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.concurrency, 100);
        assert_eq!(settings.timeout_ms, 750);
        assert_eq!((settings.start_port, settings.end_port), (1, 1024));
        assert!(!settings.banner);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"concurrency": 250, "banner": true}}"#).unwrap();

        let settings = Settings::load_from(file.path()).unwrap();

        assert_eq!(settings.concurrency, 250);
        assert!(settings.banner);
        assert_eq!(settings.timeout_ms, 750);
        assert_eq!(settings.output, "plain");
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "concurrency = 5").unwrap();

        assert!(matches!(
            Settings::load_from(file.path()),
            Err(ConfigError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");

        assert!(matches!(
            Settings::load_from(&missing),
            Err(ConfigError::ReadFailed { .. })
        ));
    }
}
