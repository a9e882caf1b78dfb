//! Audio Engine
//!
//! Tone playback on the selected output route using rodio.

use super::route::OutputRoute;
use super::tones::{AcousticProfile, ToneSegment};
use super::{AudioConfig, AudioError};
use rodio::cpal::traits::{DeviceTrait, HostTrait};
use rodio::source::{SineWave, Source, Zero};
use rodio::{OutputStream, Sink};
use std::time::Duration;

/// Sample rate used for generated silence.
const SILENCE_SAMPLE_RATE: u32 = 48_000;

/// Trait for the hardware audio primitive.
///
/// Emission is fire-and-forget: implementations start the tone and return
/// without waiting for it to finish sounding.
pub trait AudioOutput: Send + Sync {
    /// Start playing `profile` on `route`
    fn emit_tone(&self, profile: AcousticProfile, route: OutputRoute) -> Result<(), AudioError>;
}

/// Default audio output backed by the system audio host.
pub struct DefaultAudioOutput {
    config: AudioConfig,
}

impl DefaultAudioOutput {
    /// Create a new audio output with the given configuration
    pub fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    /// Device name fragment configured for a route, if any.
    pub fn device_hint(&self, route: OutputRoute) -> Option<&str> {
        match route {
            OutputRoute::AlternateOutput => self.config.alternate_device.as_deref(),
            OutputRoute::PrimaryAlarmOutput => self.config.primary_device.as_deref(),
        }
    }

    /// Find the output device for a route.
    ///
    /// A configured name fragment that matches no device falls back to the
    /// host default.
    fn find_device(&self, route: OutputRoute) -> Result<rodio::Device, AudioError> {
        let host = rodio::cpal::default_host();

        if let Some(hint) = self.device_hint(route) {
            let hint = hint.to_lowercase();
            let devices = host
                .output_devices()
                .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))?;

            for device in devices {
                let name = device.name().unwrap_or_default();
                if name.to_lowercase().contains(&hint) {
                    tracing::debug!("Using output device '{}' for {}", name, route);
                    return Ok(device);
                }
            }

            tracing::warn!("No output device matches '{}', using default", hint);
        }

        host.default_output_device()
            .ok_or_else(|| AudioError::DeviceNotAvailable("no default output device".to_string()))
    }

    fn amplitude(&self) -> f32 {
        f32::from(self.config.volume.min(100)) / 100.0
    }
}

impl AudioOutput for DefaultAudioOutput {
    fn emit_tone(&self, profile: AcousticProfile, route: OutputRoute) -> Result<(), AudioError> {
        if !self.config.enabled {
            tracing::debug!("Audio disabled, skipping {:?}", profile.waveform);
            return Ok(());
        }

        let device = self.find_device(route)?;
        let segments = profile.waveform.render(profile.duration_ms);
        let volume = self.amplitude();

        // The output stream is not Send, so it is opened on the playback thread
        std::thread::Builder::new()
            .name("tone-playback".to_string())
            .spawn(move || {
                if let Err(e) = play_segments(&device, &segments, volume) {
                    tracing::warn!("Tone playback failed: {}", e);
                }
            })
            .map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

        Ok(())
    }
}

fn play_segments(
    device: &rodio::Device,
    segments: &[ToneSegment],
    volume: f32,
) -> Result<(), AudioError> {
    let (_stream, stream_handle) = OutputStream::try_from_device(device)
        .map_err(|e| AudioError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| AudioError::PlaybackFailed(e.to_string()))?;

    for segment in segments {
        let duration = Duration::from_millis(segment.duration_ms);
        if segment.is_pause() {
            sink.append(Zero::<f32>::new(1, SILENCE_SAMPLE_RATE).take_duration(duration));
        } else {
            sink.append(
                SineWave::new(segment.frequency_hz)
                    .take_duration(duration)
                    .amplify(volume),
            );
        }
    }

    sink.sleep_until_end();
    Ok(())
}
