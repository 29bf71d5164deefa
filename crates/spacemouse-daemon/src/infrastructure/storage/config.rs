//! TOML-based configuration for the daemon binary.
//!
//! Reads and writes `DaemonConfig` at the platform-appropriate path:
//! - Linux:    `$XDG_CONFIG_HOME/spacemouse/config.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/SpaceMouse/config.toml`
//! - Windows:  `%APPDATA%\SpaceMouse\config.toml`
//!
//! ```toml
//! [daemon]
//! backend = "spnav"
//! poll_interval_ms = 1
//! log_level = "info"
//!
//! [spnav]
//! socket_path = "/var/run/spnav.sock"
//! ```
//!
//! Every field has a default, so a missing file, a missing section or a
//! missing key all fall back to the values above.  A loaded file is
//! validated: `poll_interval_ms` must be at least 1, and `backend` must name
//! a real device backend.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::backend::BackendKind;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// The file parsed but holds a value the daemon cannot run with.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    #[serde(default)]
    pub daemon: DaemonSection,
    #[serde(default)]
    pub spnav: SpnavSection,
}

/// General daemon settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DaemonSection {
    /// Which backend to run.
    #[serde(default = "default_backend")]
    pub backend: BackendKind,
    /// Wait between polls for pull backends, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// spacenavd settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpnavSection {
    #[serde(default = "default_socket_path")]
    pub socket_path: PathBuf,
}

impl DaemonConfig {
    /// Rejects values that parse but cannot be run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "daemon.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.daemon.backend == BackendKind::Mock {
            return Err(ConfigError::Invalid(
                "daemon.backend = \"mock\" is for tests only".to_string(),
            ));
        }
        Ok(())
    }
}

impl DaemonSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_backend() -> BackendKind {
    BackendKind::Spnav
}
fn default_poll_interval_ms() -> u64 {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_socket_path() -> PathBuf {
    PathBuf::from("/var/run/spnav.sock")
}

impl Default for DaemonSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            poll_interval_ms: default_poll_interval_ms(),
            log_level: default_log_level(),
        }
    }
}

impl Default for SpnavSection {
    fn default() -> Self {
        Self {
            socket_path: default_socket_path(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory cannot
/// be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads the config from the platform path, or defaults if the file does not
/// exist yet.
pub fn load_config() -> Result<DaemonConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads the config from `path`, or defaults if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed, and
/// [`ConfigError::Invalid`] if it fails [`DaemonConfig::validate`].
pub fn load_config_from(path: &Path) -> Result<DaemonConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let config: DaemonConfig = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DaemonConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the platform path.
pub fn save_config(config: &DaemonConfig) -> Result<(), ConfigError> {
    save_config_to(&config_file_path()?, config)
}

/// Persists `config` to `path`, creating parent directories as needed.
pub fn save_config_to(path: &Path, config: &DaemonConfig) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("SpaceMouse"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("spacemouse"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("SpaceMouse")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
