//! Audio Output Module
//!
//! Provides the tone catalog, output route selection and tone playback.

pub mod engine;
pub mod route;
pub mod tones;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export main types
pub use engine::{AudioOutput, DefaultAudioOutput};
pub use route::{ConnectivityError, ConnectivityProbe, NoAccessory, OutputRoute, RouteSelector};
pub use tones::{AcousticProfile, ToneCatalog, ToneId, ToneSegment, Waveform};

/// Errors that can occur during audio operations
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),

    #[error("Playback failed: {0}")]
    PlaybackFailed(String),
}

/// Audio configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master enable for tone output
    pub enabled: bool,
    /// Master volume (0-100)
    pub volume: u8,
    /// Output device name fragment for the alarm route (None = host default)
    pub primary_device: Option<String>,
    /// Output device name fragment for the accessory route (None = host default)
    pub alternate_device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 100,
            primary_device: None,
            alternate_device: None,
        }
    }
}
