//! After-blow delay steps.
//!
//! The pause between a trigger and the tone, in eleven 100 ms steps from
//! none to one second.

use super::AlarmError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Delay between the trigger and the tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AfterBlowDelay {
    None,
    Ms100,
    Ms200,
    Ms300,
    Ms400,
    Ms500,
    Ms600,
    Ms700,
    Ms800,
    Ms900,
    Ms1000,
}

impl Default for AfterBlowDelay {
    fn default() -> Self {
        AfterBlowDelay::Ms500
    }
}

impl AfterBlowDelay {
    /// Every step, shortest first.
    pub const ALL: [AfterBlowDelay; 11] = [
        AfterBlowDelay::None,
        AfterBlowDelay::Ms100,
        AfterBlowDelay::Ms200,
        AfterBlowDelay::Ms300,
        AfterBlowDelay::Ms400,
        AfterBlowDelay::Ms500,
        AfterBlowDelay::Ms600,
        AfterBlowDelay::Ms700,
        AfterBlowDelay::Ms800,
        AfterBlowDelay::Ms900,
        AfterBlowDelay::Ms1000,
    ];

    /// Step size between consecutive delays.
    pub const STEP_MS: u64 = 100;

    /// Delay length in milliseconds.
    pub const fn as_millis(self) -> u64 {
        match self {
            AfterBlowDelay::None => 0,
            AfterBlowDelay::Ms100 => 100,
            AfterBlowDelay::Ms200 => 200,
            AfterBlowDelay::Ms300 => 300,
            AfterBlowDelay::Ms400 => 400,
            AfterBlowDelay::Ms500 => 500,
            AfterBlowDelay::Ms600 => 600,
            AfterBlowDelay::Ms700 => 700,
            AfterBlowDelay::Ms800 => 800,
            AfterBlowDelay::Ms900 => 900,
            AfterBlowDelay::Ms1000 => 1000,
        }
    }

    pub fn as_duration(self) -> Duration {
        Duration::from_millis(self.as_millis())
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            AfterBlowDelay::None => "None",
            AfterBlowDelay::Ms100 => "0.1 s",
            AfterBlowDelay::Ms200 => "0.2 s",
            AfterBlowDelay::Ms300 => "0.3 s",
            AfterBlowDelay::Ms400 => "0.4 s",
            AfterBlowDelay::Ms500 => "0.5 s",
            AfterBlowDelay::Ms600 => "0.6 s",
            AfterBlowDelay::Ms700 => "0.7 s",
            AfterBlowDelay::Ms800 => "0.8 s",
            AfterBlowDelay::Ms900 => "0.9 s",
            AfterBlowDelay::Ms1000 => "1 s",
        }
    }

    /// One step longer, saturating at one second.
    pub fn next(self) -> Self {
        Self::from_millis(self.as_millis() + Self::STEP_MS).unwrap_or(self)
    }

    /// One step shorter, saturating at none.
    pub fn previous(self) -> Self {
        self.as_millis()
            .checked_sub(Self::STEP_MS)
            .and_then(Self::from_millis)
            .unwrap_or(self)
    }

    /// Look up the step for an exact millisecond value.
    pub fn from_millis(ms: u64) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_millis() == ms)
    }
}

impl fmt::Display for AfterBlowDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AfterBlowDelay {
    type Err = AlarmError;

    /// Accepts the menu label ("0.3 s"), seconds ("0.3", "1"),
    /// milliseconds ("300ms") or "none".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || AlarmError::UnknownDelay(s.to_string());
        let text = s.trim().to_ascii_lowercase();

        if text == "none" || text == "0" {
            return Ok(AfterBlowDelay::None);
        }

        let ms = if let Some(ms) = text.strip_suffix("ms") {
            ms.trim().parse::<u64>().map_err(|_| unknown())?
        } else {
            let secs = text.strip_suffix('s').unwrap_or(&text).trim();
            let secs: f64 = secs.parse().map_err(|_| unknown())?;
            if !(0.0..=1.0).contains(&secs) {
                return Err(unknown());
            }
            (secs * 1000.0).round() as u64
        };

        Self::from_millis(ms).ok_or_else(unknown)
    }
}

impl TryFrom<String> for AfterBlowDelay {
    type Error = AlarmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AfterBlowDelay> for String {
    fn from(value: AfterBlowDelay) -> Self {
        value.label().to_string()
    }
}
