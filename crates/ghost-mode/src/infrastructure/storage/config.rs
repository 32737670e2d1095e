//! TOML-based configuration for Ghost Mode.
//!
//! Reads `GhostConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\GhostMode\config.toml`
//! - Linux:    `~/.config/ghostmode/config.toml` (or `$XDG_CONFIG_HOME`)
//! - macOS:    `~/Library/Application Support/GhostMode/config.toml`
//!
//! The `GHOST_MODE_CONFIG` environment variable overrides the path.
//!
//! # Example file
//!
//! ```toml
//! [general]
//! log_level = "info"
//! platform = "auto"          # auto | restricted | open
//!
//! [paths]
//! target_processes = "config/target_processes.txt"
//! audit_log = "ghost_mode_audit.log"
//!
//! [network]
//! interface = "wlan0"
//!
//! [location]
//! latitude = 48.85
//! longitude = 2.35
//! ```
//!
//! Every field has a serde default, so an empty or partial file is valid.
//! Relative paths are resolved against the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::application::capabilities::Platform;
use crate::application::location_control::SpoofCoordinates;
use crate::application::orchestrator::OrchestratorSettings;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "GHOST_MODE_CONFIG";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GhostConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub location: LocationConfig,
}

/// Platform choice as written in the config file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    /// Restricted on Windows hosts, Open elsewhere.
    #[default]
    Auto,
    Restricted,
    Open,
}

impl PlatformChoice {
    pub fn resolve(self) -> Platform {
        match self {
            PlatformChoice::Auto => Platform::host(),
            PlatformChoice::Restricted => Platform::Restricted,
            PlatformChoice::Open => Platform::Open,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub platform: PlatformChoice,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PathsConfig {
    /// Newline-delimited list of process names to terminate.
    #[serde(default = "default_target_processes")]
    pub target_processes: PathBuf,
    /// Append-only audit trail.
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Interface whose hardware address is randomized on the open platform.
    #[serde(default = "default_interface")]
    pub interface: String,
}

/// Fixed spoof coordinates; absent values are randomized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LocationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_target_processes() -> PathBuf {
    PathBuf::from("config").join("target_processes.txt")
}
fn default_audit_log() -> PathBuf {
    PathBuf::from("ghost_mode_audit.log")
}
fn default_interface() -> String {
    "wlan0".to_string()
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            platform: PlatformChoice::default(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            target_processes: default_target_processes(),
            audit_log: default_audit_log(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
        }
    }
}

impl GhostConfig {
    pub fn platform(&self) -> Platform {
        self.general.platform.resolve()
    }

    pub fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            network_interface: self.network.interface.clone(),
            coordinates: SpoofCoordinates {
                latitude: self.location.latitude,
                longitude: self.location.longitude,
            },
        }
    }
}

// ── Config loading ────────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the config file path, honoring [`CONFIG_PATH_ENV`].
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if no override is set and the
/// base directory cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
        _ => Ok(config_dir()?.join("config.toml")),
    }
}

/// Loads `GhostConfig` from `path`, returning the defaults if the file does
/// not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<GhostConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(GhostConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Loads the config from the resolved path.
///
/// # Errors
///
/// See [`config_file_path`] and [`load_config_from`].
pub fn load_config() -> Result<GhostConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Like [`load_config`] but never fails: problems are logged and the
/// defaults are used.
///
/// Runs before the tracing subscriber exists, so the warning is returned
/// alongside the config for the caller to log once logging is up.
pub fn load_config_or_default() -> (GhostConfig, Option<String>) {
    match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (
            GhostConfig::default(),
            Some(format!("using default configuration: {e}")),
        ),
    }
}

/// Logs the effective configuration at startup.
pub fn log_effective_config(config: &GhostConfig, warning: Option<&str>) {
    if let Some(warning) = warning {
        warn!("{warning}");
    }
    info!(
        "platform={} targets={} audit_log={} interface={}",
        config.platform(),
        config.paths.target_processes.display(),
        config.paths.audit_log.display(),
        config.network.interface
    );
}

/// Resolves the platform config base directory including the `GhostMode`
/// subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("GhostMode"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("ghostmode"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("GhostMode")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
