//! Buzzer controller.
//!
//! Holds the user's current tone and delay selection and turns a trigger
//! into a scheduler request. An accepted request also starts a progress
//! sequence spanning the same delay; the two are tied together only by
//! that value.

use super::keys::{KeyAction, TriggerKey};
use crate::alarm::{
    AfterBlowDelay, AlarmConfig, AlarmError, ProgressSequence, ProgressSimulator, RequestOutcome,
    ToneScheduler,
};
use crate::audio::ToneId;

/// Button caption while a cycle is in flight.
pub const BUSY_LABEL: &str = "Playing…";
/// Button caption while idle.
pub const READY_LABEL: &str = "Play Sound";

/// Result of a trigger.
#[derive(Debug)]
pub struct Fired {
    pub outcome: RequestOutcome,
    /// Countdown for the delay, present only when the request was accepted
    pub progress: Option<ProgressSequence>,
}

/// What a key press led to.
#[derive(Debug)]
pub enum Handled {
    Fired(Fired),
    ToneSelected(ToneId),
    DelaySelected(AfterBlowDelay),
    ShowHelp,
    Quit,
}

/// Front-end facing controller for one buzzer.
pub struct Buzzer {
    scheduler: ToneScheduler,
    progress: ProgressSimulator,
    tone: ToneId,
    delay: AfterBlowDelay,
}

impl Buzzer {
    /// Create a controller with the configured default selection.
    pub fn new(scheduler: ToneScheduler, progress: ProgressSimulator, config: &AlarmConfig) -> Self {
        Self {
            scheduler,
            progress,
            tone: config.default_tone,
            delay: config.default_delay,
        }
    }

    pub fn tone(&self) -> ToneId {
        self.tone
    }

    pub fn delay(&self) -> AfterBlowDelay {
        self.delay
    }

    pub fn set_tone(&mut self, tone: ToneId) {
        tracing::info!("Tone selected: {}", tone.display_name());
        self.tone = tone;
    }

    pub fn set_delay(&mut self, delay: AfterBlowDelay) {
        tracing::info!("After-blow delay selected: {}", delay);
        self.delay = delay;
    }

    pub fn scheduler(&self) -> &ToneScheduler {
        &self.scheduler
    }

    /// Whether a cycle is in flight.
    pub fn is_busy(&self) -> bool {
        self.scheduler.is_busy()
    }

    /// Caption for a trigger button.
    pub fn button_label(&self) -> &'static str {
        if self.is_busy() {
            BUSY_LABEL
        } else {
            READY_LABEL
        }
    }

    /// Fire the buzzer with the current selection.
    pub async fn trigger(&self, key: TriggerKey) -> Result<Fired, AlarmError> {
        tracing::debug!("Trigger from {}", key);

        let outcome = self.scheduler.request(self.tone, self.delay).await?;

        let progress = match outcome {
            RequestOutcome::Accepted => Some(self.progress.start(self.delay.as_millis())),
            RequestOutcome::Dropped => None,
        };

        Ok(Fired { outcome, progress })
    }

    /// Apply a key action.
    pub async fn handle(&mut self, action: KeyAction) -> Result<Handled, AlarmError> {
        match action {
            KeyAction::Trigger(key) => Ok(Handled::Fired(self.trigger(key).await?)),
            KeyAction::SelectTone(tone) => {
                self.set_tone(tone);
                Ok(Handled::ToneSelected(tone))
            }
            KeyAction::SelectDelay(delay) => {
                self.set_delay(delay);
                Ok(Handled::DelaySelected(delay))
            }
            KeyAction::NextDelay => {
                self.set_delay(self.delay.next());
                Ok(Handled::DelaySelected(self.delay))
            }
            KeyAction::PreviousDelay => {
                self.set_delay(self.delay.previous());
                Ok(Handled::DelaySelected(self.delay))
            }
            KeyAction::ShowHelp => Ok(Handled::ShowHelp),
            KeyAction::Quit => Ok(Handled::Quit),
        }
    }
}
