//! Output route selection.
//!
//! A tone goes to the alternate output when a qualifying audio accessory is
//! connected, otherwise to the primary alarm output. The check is made
//! fresh for every cycle and never blocks playback: any failure to probe
//! counts as "not connected".

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Where a tone is played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputRoute {
    /// Connected accessory (headset, wireless speaker)
    AlternateOutput,
    /// Built-in alarm output
    PrimaryAlarmOutput,
}

impl fmt::Display for OutputRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputRoute::AlternateOutput => write!(f, "alternate output"),
            OutputRoute::PrimaryAlarmOutput => write!(f, "primary alarm output"),
        }
    }
}

/// Errors from a connectivity check.
#[derive(Debug, Error)]
pub enum ConnectivityError {
    #[error("Bluetooth adapter not found")]
    AdapterNotFound,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("BLE error: {0}")]
    BleError(String),

    #[error("Connectivity check timed out")]
    Timeout,
}

/// Trait for accessory connectivity checks
pub trait ConnectivityProbe: Send + Sync {
    /// Whether a qualifying audio accessory is connected right now
    fn is_accessory_connected(
        &self,
    ) -> impl Future<Output = Result<bool, ConnectivityError>> + Send;
}

/// Picks the output route for a tone cycle.
pub struct RouteSelector<P> {
    probe: P,
    timeout: Duration,
}

impl<P: ConnectivityProbe> RouteSelector<P> {
    /// Create a selector that waits at most `timeout` for the probe.
    pub fn new(probe: P, timeout: Duration) -> Self {
        Self { probe, timeout }
    }

    /// Access the underlying probe.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Select the route for the current cycle.
    pub async fn select_route(&self) -> OutputRoute {
        let connected = match tokio::time::timeout(self.timeout, self.probe.is_accessory_connected())
            .await
            .unwrap_or(Err(ConnectivityError::Timeout))
        {
            Ok(connected) => connected,
            Err(e) => {
                tracing::warn!("Accessory check failed, using alarm output: {}", e);
                false
            }
        };

        let route = if connected {
            OutputRoute::AlternateOutput
        } else {
            OutputRoute::PrimaryAlarmOutput
        };

        tracing::debug!("Selected {}", route);
        route
    }
}

/// Probe that never reports an accessory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAccessory;

impl ConnectivityProbe for NoAccessory {
    async fn is_accessory_connected(&self) -> Result<bool, ConnectivityError> {
        Ok(false)
    }
}
