//! Input handling module.
//!
//! Trigger keys and the buzzer controller that turns them into tone
//! requests.

pub mod buzzer;
pub mod keys;

pub use buzzer::{Buzzer, Fired, Handled, BUSY_LABEL, READY_LABEL};
pub use keys::{KeyAction, KeyHandler, TriggerKey};
