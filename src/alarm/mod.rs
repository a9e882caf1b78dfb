//! Alarm Module
//!
//! The after-blow alarm: a trigger schedules one tone cycle
//! (delay, then tone, then back to idle) while a progress sequence
//! counts down the same delay for display.

pub mod delay;
pub mod progress;
pub mod scheduler;

use crate::audio::{OutputRoute, ToneId};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// Re-export main types
pub use delay::AfterBlowDelay;
pub use progress::{ProgressSequence, ProgressSimulator, ProgressState};
pub use scheduler::{
    ArmedTimer, CyclePlan, SchedulerCore, Step, TimerKind, ToneScheduler,
};

/// Errors raised at the alarm boundary
#[derive(Debug, Error)]
pub enum AlarmError {
    #[error("Unknown tone: {0}")]
    UnknownTone(String),

    #[error("Unknown after-blow delay: {0}")]
    UnknownDelay(String),

    #[error("Tone scheduler is not running")]
    SchedulerStopped,
}

/// Scheduler state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SchedulerState {
    /// Ready to accept a request
    #[default]
    Idle,
    /// Waiting out the after-blow delay
    Delaying,
    /// Tone is sounding
    Sounding,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Idle => write!(f, "Idle"),
            SchedulerState::Delaying => write!(f, "Delaying"),
            SchedulerState::Sounding => write!(f, "Sounding"),
        }
    }
}

/// Result of a tone request. A dropped request is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new cycle was armed
    Accepted,
    /// A cycle was already in flight
    Dropped,
}

/// Alarm events for monitoring
#[derive(Debug, Clone, PartialEq)]
pub enum AlarmEvent {
    /// Delay timer armed for a new cycle
    CycleArmed {
        tone: ToneId,
        delay: AfterBlowDelay,
        route: OutputRoute,
    },
    /// Request arrived while a cycle was in flight
    RequestDropped {
        tone: ToneId,
        delay: AfterBlowDelay,
    },
    /// Tone handed to the audio output
    ToneStarted { tone: ToneId, route: OutputRoute },
    /// Audio output refused the tone; the cycle continues
    PlaybackFailed { tone: ToneId, message: String },
    /// Duration elapsed, scheduler is idle again
    CycleCompleted { tone: ToneId },
}

/// Alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Tone selected at startup
    pub default_tone: ToneId,
    /// After-blow delay selected at startup
    pub default_delay: AfterBlowDelay,
    /// Capacity of the alarm event broadcast channel
    pub event_capacity: usize,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            default_tone: ToneId::First,
            default_delay: AfterBlowDelay::Ms500,
            event_capacity: 64,
        }
    }
}
