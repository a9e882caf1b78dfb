//! Tournament Buzzer - after-blow alarm signal
//!
//! A single-button alarm: on trigger it sounds a tone after a configurable
//! delay, routed to a connected audio accessory when one is present, while
//! a progress sequence counts the delay down. At most one tone cycle is
//! ever in flight.

pub mod alarm;
pub mod audio;
pub mod input;
pub mod sensors;
pub mod storage;

// Re-export commonly used types
pub use alarm::{AfterBlowDelay, ProgressSimulator, RequestOutcome, SchedulerState, ToneScheduler};
pub use audio::{OutputRoute, RouteSelector, ToneCatalog, ToneId};
pub use input::Buzzer;
pub use storage::config::AppConfig;
