//! Application configuration.
//!
//! Loaded once at startup from TOML. Every section falls back to its
//! defaults, and a missing file yields the default configuration.

use crate::alarm::progress::DEFAULT_TICK_INTERVAL_MS;
use crate::alarm::AlarmConfig;
use crate::audio::AudioConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Data directory path
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Tone and delay selection
    pub alarm: AlarmConfig,
    /// Tone output
    pub audio: AudioConfig,
    /// Output route selection
    pub route: RouteSettings,
    /// Progress indicator
    pub progress: ProgressSettings,
}

/// Route selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Query Bluetooth for a connected audio accessory
    pub probe_bluetooth: bool,
    /// Longest wait for the accessory check, in milliseconds
    pub probe_timeout_ms: u64,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            probe_bluetooth: true,
            probe_timeout_ms: 250,
        }
    }
}

impl RouteSettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

/// Progress indicator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
    /// Tick interval in milliseconds
    pub tick_interval_ms: u64,
}

impl Default for ProgressSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ProgressSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

/// Get the application data directory.
pub fn get_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "tournamentbuzzer", "TournamentBuzzer")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the configuration file path.
pub fn get_config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Load application configuration from the default location.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&get_config_path())
}

/// Load application configuration from `path`.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        let config = AppConfig {
            data_dir: get_data_dir(),
            ..Default::default()
        };
        return Ok(config);
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

    let mut config: AppConfig =
        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

    config.data_dir = get_data_dir();

    tracing::info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}
