//! Tone catalog and waveform patterns.
//!
//! Each selectable tone maps to exactly one acoustic profile: the waveform
//! to synthesize and how long it sounds. The table is defined once and
//! indexed by the closed `ToneId` enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::alarm::AlarmError;

/// Tone frequencies in Hz.
pub mod frequencies {
    /// Call guard beep
    pub const CALL_GUARD: f32 = 1319.0;
    /// Abbreviated alert, high half
    pub const ALERT_HIGH: f32 = 1150.0;
    /// Abbreviated alert, low half
    pub const ALERT_LOW: f32 = 770.0;
    /// Emergency ringback, first partial
    pub const RINGBACK_LOW: f32 = 941.0;
    /// Emergency ringback, second partial
    pub const RINGBACK_HIGH: f32 = 1209.0;
    /// Alarm siren, high half
    pub const SIREN_HIGH: f32 = 1200.0;
    /// Alarm siren, low half
    pub const SIREN_LOW: f32 = 800.0;
}

/// User-selectable tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneId {
    #[default]
    First,
    Second,
    Third,
    Fourth,
}

impl ToneId {
    /// Every tone, in menu order.
    pub const ALL: [ToneId; 4] = [ToneId::First, ToneId::Second, ToneId::Third, ToneId::Fourth];

    /// Position of this tone in [`ToneId::ALL`].
    pub const fn index(self) -> usize {
        match self {
            ToneId::First => 0,
            ToneId::Second => 1,
            ToneId::Third => 2,
            ToneId::Fourth => 3,
        }
    }

    /// Get display name for this tone
    pub fn display_name(&self) -> &'static str {
        match self {
            ToneId::First => "First",
            ToneId::Second => "Second",
            ToneId::Third => "Third",
            ToneId::Fourth => "Fourth",
        }
    }
}

impl fmt::Display for ToneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ToneId {
    type Err = AlarmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" | "1" => Ok(ToneId::First),
            "second" | "2" => Ok(ToneId::Second),
            "third" | "3" => Ok(ToneId::Third),
            "fourth" | "4" => Ok(ToneId::Fourth),
            _ => Err(AlarmError::UnknownTone(s.to_string())),
        }
    }
}

/// One segment of a waveform pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSegment {
    /// Frequency in Hz (0 for silence)
    pub frequency_hz: f32,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl ToneSegment {
    /// Create a sounding segment.
    pub const fn new(frequency_hz: f32, duration_ms: u64) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    /// Create a silent segment.
    pub const fn pause(duration_ms: u64) -> Self {
        Self {
            frequency_hz: 0.0,
            duration_ms,
        }
    }

    /// Check if this is a pause.
    pub fn is_pause(&self) -> bool {
        self.frequency_hz <= 0.0
    }
}

const CALL_GUARD_PATTERN: &[ToneSegment] = &[
    ToneSegment::new(frequencies::CALL_GUARD, 125),
    ToneSegment::pause(125),
];

const ABBREVIATED_ALERT_PATTERN: &[ToneSegment] = &[
    ToneSegment::new(frequencies::ALERT_HIGH, 60),
    ToneSegment::new(frequencies::ALERT_LOW, 60),
];

const EMERGENCY_RINGBACK_PATTERN: &[ToneSegment] = &[
    ToneSegment::new(frequencies::RINGBACK_LOW, 125),
    ToneSegment::new(frequencies::RINGBACK_HIGH, 125),
    ToneSegment::pause(250),
];

const HIGH_LOW_ALARM_PATTERN: &[ToneSegment] = &[
    ToneSegment::new(frequencies::SIREN_HIGH, 250),
    ToneSegment::new(frequencies::SIREN_LOW, 250),
];

/// Alert waveform the output device renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Waveform {
    /// Short high beeps separated by equal gaps
    CallGuard,
    /// Rapid two-tone warble
    AbbreviatedAlert,
    /// Dual-partial ring with a trailing gap
    EmergencyRingback,
    /// Slow high/low siren
    HighLowAlarm,
}

impl Waveform {
    /// One period of the pattern. Playback repeats it until the profile
    /// duration is filled.
    pub fn pattern(&self) -> &'static [ToneSegment] {
        match self {
            Waveform::CallGuard => CALL_GUARD_PATTERN,
            Waveform::AbbreviatedAlert => ABBREVIATED_ALERT_PATTERN,
            Waveform::EmergencyRingback => EMERGENCY_RINGBACK_PATTERN,
            Waveform::HighLowAlarm => HIGH_LOW_ALARM_PATTERN,
        }
    }

    /// Expand the pattern into segments covering exactly `duration_ms`.
    pub fn render(&self, duration_ms: u64) -> Vec<ToneSegment> {
        let mut segments = Vec::new();
        let mut remaining = duration_ms;

        for segment in self.pattern().iter().cycle() {
            if remaining == 0 {
                break;
            }
            let len = segment.duration_ms.min(remaining);
            segments.push(ToneSegment {
                frequency_hz: segment.frequency_hz,
                duration_ms: len,
            });
            remaining -= len;
        }

        segments
    }
}

/// Acoustic parameters for one tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcousticProfile {
    pub waveform: Waveform,
    pub duration_ms: u64,
}

impl AcousticProfile {
    pub const fn new(waveform: Waveform, duration_ms: u64) -> Self {
        Self {
            waveform,
            duration_ms,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}

/// Standard profiles, indexed by [`ToneId::index`].
pub const STANDARD_PROFILES: [AcousticProfile; 4] = [
    AcousticProfile::new(Waveform::CallGuard, 800),
    AcousticProfile::new(Waveform::AbbreviatedAlert, 800),
    AcousticProfile::new(Waveform::EmergencyRingback, 1500),
    AcousticProfile::new(Waveform::HighLowAlarm, 2500),
];

/// Static lookup from tone to acoustic profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToneCatalog {
    profiles: [AcousticProfile; 4],
}

impl Default for ToneCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl ToneCatalog {
    /// The catalog shipped with the buzzer.
    pub const fn standard() -> Self {
        Self {
            profiles: STANDARD_PROFILES,
        }
    }

    /// Build a catalog from a custom table, one entry per tone in
    /// [`ToneId::ALL`] order.
    pub const fn new(profiles: [AcousticProfile; 4]) -> Self {
        Self { profiles }
    }

    /// Resolve a tone to its profile.
    pub fn resolve(&self, tone: ToneId) -> AcousticProfile {
        self.profiles[tone.index()]
    }

    /// Longest tone in the catalog.
    pub fn longest(&self) -> Duration {
        let max = self.profiles.iter().map(|p| p.duration_ms).max().unwrap_or(0);
        Duration::from_millis(max)
    }
}
