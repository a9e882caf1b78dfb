//! Sensor module for audio accessory detection.

pub mod bluetooth;

pub use bluetooth::{AccessoryProbe, BluetoothAudioProbe, AUDIO_SERVICE_UUIDS};
