//! Bluetooth audio accessory detection.
//!
//! Looks for a connected peripheral that advertises an audio profile
//! (A2DP, headset, hands-free or LE Audio). Each check is made fresh
//! against the first BLE adapter the platform reports.

use crate::audio::{ConnectivityError, ConnectivityProbe};
use btleplug::api::{Central, Manager as _, Peripheral as _};
use btleplug::platform::{Adapter, Manager, Peripheral};
use uuid::Uuid;

/// A2DP audio sink
pub const A2DP_SINK_UUID: Uuid = Uuid::from_u128(0x0000_110b_0000_1000_8000_0080_5f9b_34fb);
/// A2DP audio source
pub const A2DP_SOURCE_UUID: Uuid = Uuid::from_u128(0x0000_110a_0000_1000_8000_0080_5f9b_34fb);
/// Headset profile
pub const HEADSET_UUID: Uuid = Uuid::from_u128(0x0000_1108_0000_1000_8000_0080_5f9b_34fb);
/// Hands-free profile
pub const HANDS_FREE_UUID: Uuid = Uuid::from_u128(0x0000_111e_0000_1000_8000_0080_5f9b_34fb);
/// LE Audio published audio capabilities
pub const PUBLISHED_AUDIO_CAPABILITIES_UUID: Uuid =
    Uuid::from_u128(0x0000_1850_0000_1000_8000_0080_5f9b_34fb);
/// LE Audio audio stream control
pub const AUDIO_STREAM_CONTROL_UUID: Uuid =
    Uuid::from_u128(0x0000_184e_0000_1000_8000_0080_5f9b_34fb);

/// Services that mark a peripheral as an audio accessory.
pub const AUDIO_SERVICE_UUIDS: [Uuid; 6] = [
    A2DP_SINK_UUID,
    A2DP_SOURCE_UUID,
    HEADSET_UUID,
    HANDS_FREE_UUID,
    PUBLISHED_AUDIO_CAPABILITIES_UUID,
    AUDIO_STREAM_CONTROL_UUID,
];

/// Whether any advertised service is an audio profile.
pub fn is_audio_service_set(services: &[Uuid]) -> bool {
    services.iter().any(|s| AUDIO_SERVICE_UUIDS.contains(s))
}

fn ble_error(e: btleplug::Error) -> ConnectivityError {
    match e {
        btleplug::Error::PermissionDenied => {
            ConnectivityError::PermissionDenied("bluetooth".to_string())
        }
        other => ConnectivityError::BleError(other.to_string()),
    }
}

/// Probe backed by the platform BLE stack.
#[derive(Debug, Clone, Copy, Default)]
pub struct BluetoothAudioProbe;

impl BluetoothAudioProbe {
    pub fn new() -> Self {
        Self
    }

    async fn adapter() -> Result<Adapter, ConnectivityError> {
        let manager = Manager::new().await.map_err(ble_error)?;

        let adapters = manager.adapters().await.map_err(ble_error)?;

        adapters
            .into_iter()
            .next()
            .ok_or(ConnectivityError::AdapterNotFound)
    }

    async fn is_audio_accessory(peripheral: &Peripheral) -> bool {
        match peripheral.is_connected().await {
            Ok(true) => {}
            _ => return false,
        }

        let Ok(Some(properties)) = peripheral.properties().await else {
            return false;
        };

        if is_audio_service_set(&properties.services) {
            tracing::debug!(
                "Audio accessory connected: {}",
                properties
                    .local_name
                    .unwrap_or_else(|| peripheral.id().to_string())
            );
            return true;
        }
        false
    }
}

impl ConnectivityProbe for BluetoothAudioProbe {
    async fn is_accessory_connected(&self) -> Result<bool, ConnectivityError> {
        let adapter = Self::adapter().await?;
        let peripherals = adapter.peripherals().await.map_err(ble_error)?;

        for peripheral in &peripherals {
            if Self::is_audio_accessory(peripheral).await {
                return Ok(true);
            }
        }

        Ok(false)
    }
}

/// Accessory probe chosen from configuration.
#[derive(Debug, Clone, Copy)]
pub enum AccessoryProbe {
    /// Query the BLE stack
    Bluetooth(BluetoothAudioProbe),
    /// Never report an accessory
    Disabled,
}

impl AccessoryProbe {
    pub fn from_enabled(enabled: bool) -> Self {
        if enabled {
            AccessoryProbe::Bluetooth(BluetoothAudioProbe::new())
        } else {
            AccessoryProbe::Disabled
        }
    }
}

impl ConnectivityProbe for AccessoryProbe {
    async fn is_accessory_connected(&self) -> Result<bool, ConnectivityError> {
        match self {
            AccessoryProbe::Bluetooth(probe) => probe.is_accessory_connected().await,
            AccessoryProbe::Disabled => Ok(false),
        }
    }
}
