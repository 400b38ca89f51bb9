//! Multi-tier TOML configuration for snap-udev.
//!
//! Reads configuration from multiple sources with precedence:
//! CLI flags > env vars > config file > defaults

use serde::{Deserialize, Serialize};
use snap_udev_interfaces::{Connection, InterfaceDecl};
use snap_udev_types::ConfigError;
use std::path::{Path, PathBuf};

/// Where snapd's helper programs live by default.
pub const DEFAULT_LIBEXEC_DIR: &str = snap_udev_interfaces::udev::DEFAULT_LIBEXEC_DIR;

/// Where generated rules files go by default.
pub const DEFAULT_RULES_DIR: &str = "/etc/udev/rules.d";

/// Resolved configuration for one generation run.
#[derive(Debug, Clone)]
pub struct SnapUdevConfig {
    pub libexec_dir: String,
    pub rules_dir: PathBuf,
    pub interfaces: Vec<InterfaceDecl>,
    pub connections: Vec<Connection>,
    pub config_dir: PathBuf,
}

/// Settings that can be read from a TOML config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsFile {
    #[serde(default)]
    pub paths: PathSettings,
    #[serde(default)]
    pub interfaces: Vec<InterfaceDecl>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathSettings {
    pub libexec_dir: Option<String>,
    pub rules_dir: Option<PathBuf>,
}

/// CLI overrides that take highest precedence.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// Explicit config file; unlike the default file it must exist and parse.
    pub config_file: Option<PathBuf>,
    pub libexec_dir: Option<String>,
    pub rules_dir: Option<PathBuf>,
}

impl SnapUdevConfig {
    /// Load configuration from all sources, applying precedence rules.
    ///
    /// Precedence (highest to lowest):
    /// 1. CLI flags
    /// 2. Environment variables (`SNAP_UDEV_LIBEXEC_DIR`, `SNAP_UDEV_RULES_DIR`)
    /// 3. Config file (`--config`, else `~/.snap-udev/config.toml`)
    /// 4. Defaults
    pub fn load(overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::load_with_env(overrides, |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an injectable environment lookup.
    pub fn load_with_env(
        overrides: CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let config_dir = env("SNAP_UDEV_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_config_dir);

        let settings = match &overrides.config_file {
            Some(path) => read_settings_file(path)?,
            None => load_settings_file(&config_dir.join("config.toml")),
        };

        // Resolve libexec dir: CLI > env > config file > default
        let libexec_dir = overrides
            .libexec_dir
            .or_else(|| env("SNAP_UDEV_LIBEXEC_DIR"))
            .or(settings.paths.libexec_dir)
            .unwrap_or_else(|| DEFAULT_LIBEXEC_DIR.to_string());
        if !libexec_dir.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "libexec_dir".into(),
                message: format!("'{libexec_dir}' is not an absolute path"),
            });
        }

        // Resolve rules dir: CLI > env > config file > default
        let rules_dir = overrides
            .rules_dir
            .or_else(|| env("SNAP_UDEV_RULES_DIR").map(PathBuf::from))
            .or(settings.paths.rules_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_DIR));

        Ok(SnapUdevConfig {
            libexec_dir,
            rules_dir,
            interfaces: settings.interfaces,
            connections: settings.connections,
            config_dir,
        })
    }
}

/// Get the default config directory path (~/.snap-udev/).
fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".snap-udev")
}

/// Load the default settings file, returning defaults on any error.
fn load_settings_file(path: &Path) -> SettingsFile {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            SettingsFile::default()
        }),
        Err(_) => SettingsFile::default(),
    }
}

/// Load an explicitly requested settings file; any failure is an error.
fn read_settings_file(path: &Path) -> Result<SettingsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
