//! Default values for a sweep, loaded from an optional TOML file.
//!
//! Every key is optional; anything left out falls back to the built-in
//! defaults, and command-line flags override both.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sweep]
//! source_dir = "/storage/emulated/0/DCIM/Camera"
//! trash_folder = "SingleTake_Trash"
//! pattern = "img-prefixed"   # or "date-time"
//! ```

use crate::file_sorter::DEFAULT_TRASH_FOLDER;
use crate::pattern::PatternVariant;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Camera roll location on Android's primary shared storage.
pub const DEFAULT_CAMERA_DIR: &str = "/storage/emulated/0/DCIM/Camera";

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".singletakerc.toml";

/// Errors that can occur while loading configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration in {}: {reason}", .path.display())]
    ConfigInvalid { path: PathBuf, reason: String },
    /// IO error while reading configuration.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    #[serde(default)]
    pub sweep: SweepSettings,
}

/// The `[sweep]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepSettings {
    /// Directory to scan.
    #[serde(default)]
    pub source_dir: Option<PathBuf>,

    /// Trash subfolder name, relative to the source directory.
    #[serde(default)]
    pub trash_folder: Option<String>,

    /// Naming convention to look for.
    #[serde(default)]
    pub pattern: Option<PatternVariant>,
}

impl SweepConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.singletakerc.toml` in the current directory
    /// 3. Look for `~/.config/singletake-cleaner/config.toml`
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly provided file is missing, or if any
    /// discovered file cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("singletake-cleaner")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Source directory, falling back to the Android camera roll.
    pub fn source_dir(&self) -> PathBuf {
        self.sweep
            .source_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CAMERA_DIR))
    }

    /// Trash folder name, falling back to `SingleTake_Trash`.
    pub fn trash_folder(&self) -> &str {
        self.sweep
            .trash_folder
            .as_deref()
            .unwrap_or(DEFAULT_TRASH_FOLDER)
    }

    pub fn pattern(&self) -> PatternVariant {
        self.sweep.pattern.unwrap_or_default()
    }
}
