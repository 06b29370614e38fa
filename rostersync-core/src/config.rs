//! Run configuration.
//!
//! # Storage layout
//!
//! ```text
//! ~/.rostersync/
//!   config.yaml   (optional: every key has a default)
//! ```
//!
//! Credentials are never read from this file; they come from CLI flags or the
//! environment.
//!
//! # API pattern
//!
//! - `load_at(home)`: explicit home; used in tests with `TempDir`
//! - `load()`: derives home from `dirs::home_dir()`, delegates to `load_at`
//! - `load_from(path)`: an explicitly named file, which must exist

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Transport retry settings for transient provider failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 250,
        }
    }
}

/// Everything a run needs besides credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Storage path of the roster markdown document.
    pub roster_path: String,
    /// Root folder of the profile tree (`<root>/<department>/<employee>/...`).
    pub profile_root: String,
    /// File-name prefix of profile documents.
    pub profile_prefix: String,
    /// File-name extension of profile documents, including the dot.
    pub profile_extension: String,
    /// Local path of the JSON run artifact.
    pub state_file: PathBuf,
    /// Number of run-artifact changes kept (most recent).
    pub artifact_change_limit: usize,
    pub retry: RetryConfig,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            roster_path: "/Finance Public/November 2025 - Employees_Public.md".to_string(),
            profile_root: "/Nov25".to_string(),
            profile_prefix: "Profile".to_string(),
            profile_extension: ".md".to_string(),
            state_file: PathBuf::from("last_sync.json"),
            artifact_change_limit: 50,
            retry: RetryConfig::default(),
        }
    }
}

impl SyncConfig {
    /// Reject values that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.profile_root.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "profile_root",
                reason: format!("'{}' must be an absolute storage path", self.profile_root),
            });
        }
        if !self.roster_path.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "roster_path",
                reason: format!("'{}' must be an absolute storage path", self.roster_path),
            });
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                field: "retry.max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Profile root without a trailing slash.
    pub fn root(&self) -> &str {
        self.profile_root.trim_end_matches('/')
    }
}

/// `<home>/.rostersync/config.yaml`: pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".rostersync").join("config.yaml")
}

/// Load `<home>/.rostersync/config.yaml`, falling back to defaults when the
/// file does not exist.
pub fn load_at(home: &Path) -> Result<SyncConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(SyncConfig::default());
    }
    load_from(&path)
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<SyncConfig, ConfigError> {
    let home = dirs::home_dir().ok_or(ConfigError::HomeNotFound)?;
    load_at(&home)
}

/// Load an explicitly named config file. Missing keys take defaults.
pub fn load_from(path: &Path) -> Result<SyncConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: SyncConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate()?;
    Ok(config)
}
