//! Key handling for the buzzer.
//!
//! Maps raw key names (terminal keys or hardware key codes) to buzzer
//! actions. Any trigger key fires the same request; the others change the
//! current selection.

use crate::alarm::AfterBlowDelay;
use crate::audio::ToneId;
use std::collections::HashMap;
use std::fmt;

/// Physical or on-screen input that fires the buzzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKey {
    /// On-screen button
    Button,
    Enter,
    Space,
    /// Hardware volume-up key
    VolumeUp,
    /// Hardware camera key
    Camera,
}

impl TriggerKey {
    pub const ALL: [TriggerKey; 5] = [
        TriggerKey::Button,
        TriggerKey::Enter,
        TriggerKey::Space,
        TriggerKey::VolumeUp,
        TriggerKey::Camera,
    ];

    /// Canonical key name.
    pub fn key_name(&self) -> &'static str {
        match self {
            TriggerKey::Button => "button",
            TriggerKey::Enter => "enter",
            TriggerKey::Space => "space",
            TriggerKey::VolumeUp => "volume_up",
            TriggerKey::Camera => "camera",
        }
    }

    /// Parse a raw key name. Accepts canonical names and platform key codes
    /// such as `KEYCODE_VOLUME_UP`.
    pub fn from_key_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("keycode_").unwrap_or(&name);

        match name {
            "button" | "b" => Some(TriggerKey::Button),
            "enter" | "return" => Some(TriggerKey::Enter),
            "space" | " " => Some(TriggerKey::Space),
            "volume_up" | "volumeup" | "volup" => Some(TriggerKey::VolumeUp),
            "camera" => Some(TriggerKey::Camera),
            _ => None,
        }
    }
}

impl fmt::Display for TriggerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// Actions a key can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    Trigger(TriggerKey),
    SelectTone(ToneId),
    SelectDelay(AfterBlowDelay),
    NextDelay,
    PreviousDelay,
    ShowHelp,
    Quit,
}

impl KeyAction {
    /// Get the description for this action.
    pub fn description(&self) -> String {
        match self {
            KeyAction::Trigger(key) => format!("Sound the buzzer ({})", key),
            KeyAction::SelectTone(tone) => format!("Select {}", tone.display_name()),
            KeyAction::SelectDelay(delay) => format!("Set after-blow delay to {}", delay),
            KeyAction::NextDelay => "Lengthen after-blow delay".to_string(),
            KeyAction::PreviousDelay => "Shorten after-blow delay".to_string(),
            KeyAction::ShowHelp => "Show key bindings".to_string(),
            KeyAction::Quit => "Quit".to_string(),
        }
    }
}

/// Key input handler.
pub struct KeyHandler {
    /// Registered bindings (lowercase key name -> action)
    bindings: HashMap<String, KeyAction>,
    /// Whether key input is accepted
    enabled: bool,
}

impl Default for KeyHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHandler {
    /// Create a handler with the default bindings.
    pub fn new() -> Self {
        let mut handler = Self {
            bindings: HashMap::new(),
            enabled: true,
        };
        handler.register_defaults();
        handler
    }

    fn register_defaults(&mut self) {
        for key in TriggerKey::ALL {
            self.bind(key.key_name(), KeyAction::Trigger(key));
        }
        self.bind("", KeyAction::Trigger(TriggerKey::Enter));
        self.bind("b", KeyAction::Trigger(TriggerKey::Button));

        for tone in ToneId::ALL {
            self.bind(&format!("t{}", tone.index() + 1), KeyAction::SelectTone(tone));
        }

        self.bind("+", KeyAction::NextDelay);
        self.bind("-", KeyAction::PreviousDelay);
        self.bind("?", KeyAction::ShowHelp);
        self.bind("h", KeyAction::ShowHelp);
        self.bind("q", KeyAction::Quit);
        self.bind("quit", KeyAction::Quit);
    }

    /// Bind a key name to an action, replacing any previous binding.
    pub fn bind(&mut self, key: &str, action: KeyAction) {
        self.bindings.insert(key.trim().to_ascii_lowercase(), action);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Resolve one line of input to an action.
    ///
    /// Besides bound names, `d<delay>` selects a delay (`d0.3`, `dnone`)
    /// and platform key codes for the trigger keys are recognised.
    pub fn handle(&self, input: &str) -> Option<KeyAction> {
        if !self.enabled {
            return None;
        }

        let key = input.trim().to_ascii_lowercase();

        if let Some(action) = self.bindings.get(&key) {
            return Some(*action);
        }

        if let Some(delay) = key.strip_prefix('d') {
            if let Ok(delay) = delay.parse::<AfterBlowDelay>() {
                return Some(KeyAction::SelectDelay(delay));
            }
        }

        TriggerKey::from_key_name(&key).map(KeyAction::Trigger)
    }

    /// Bindings as (key, action) pairs, sorted by key.
    pub fn bindings(&self) -> Vec<(String, KeyAction)> {
        let mut bindings: Vec<_> = self
            .bindings
            .iter()
            .map(|(key, action)| (key.clone(), *action))
            .collect();
        bindings.sort_by(|a, b| a.0.cmp(&b.0));
        bindings
    }
}
