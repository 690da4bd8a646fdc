use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Settable range accepted by the Breeze remote, degrees Celsius.
pub const TEMPERATURE_MIN: i32 = 16;
pub const TEMPERATURE_MAX: i32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcMode {
    Cool,
    Heat,
    Fan,
}

impl AcMode {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            AcMode::Cool => "cool",
            AcMode::Heat => "heat",
            AcMode::Fan => "fan",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "cool" => Some(AcMode::Cool),
            "heat" => Some(AcMode::Heat),
            "fan" => Some(AcMode::Fan),
            _ => None,
        }
    }
}

impl fmt::Display for AcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FanLevel {
    Low,
    Medium,
    High,
    Auto,
}

impl FanLevel {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            FanLevel::Low => "low",
            FanLevel::Medium => "medium",
            FanLevel::High => "high",
            FanLevel::Auto => "auto",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(FanLevel::Low),
            "medium" => Some(FanLevel::Medium),
            "high" => Some(FanLevel::High),
            "auto" => Some(FanLevel::Auto),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Swing {
    On,
    Off,
}

impl Swing {
    pub fn as_api_str(&self) -> &'static str {
        match self {
            Swing::On => "on",
            Swing::Off => "off",
        }
    }

    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "on" => Some(Swing::On),
            "off" => Some(Swing::Off),
            _ => None,
        }
    }
}

/// Point-in-time read of actual device state, produced by a gateway poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSnapshot {
    pub power_on: bool,
    pub mode: AcMode,
    pub target_temperature: i32,
    pub current_temperature: Option<f64>,
    pub fan_level: FanLevel,
    pub swing: Swing,
}

/// One control command as sent to the device.
///
/// The remote ignores everything but `power_on` when turning off; the full
/// set of fields is carried anyway so the gateway can log what was requested.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
    pub power_on: bool,
    pub mode: AcMode,
    pub temperature: i32,
    pub fan_level: FanLevel,
    pub swing: Swing,
}

/// Displayable view of the assumed session state, returned by every
/// controller operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub power_on: bool,
    pub mode: AcMode,
    pub temperature: i32,
    pub last_updated: Option<DateTime<Utc>>,
    /// Minutes until the scheduled shut-off fires, if one is armed.
    pub shutoff_remaining_minutes: Option<i64>,
}

/// How a scheduled shut-off ended, delivered to `on_shutoff` callbacks.
#[derive(Debug, Clone)]
pub enum ShutoffOutcome {
    /// Timer expired and the device confirmed OFF.
    Completed { status: StatusReport },
    /// Timer expired but the device did not confirm OFF; assumed state is
    /// left unchanged and the user has to correct it manually.
    GatewayFailed { reason: String, status: StatusReport },
}

/// Result of `cancel_shutoff`. Cancelling with nothing armed is a reported
/// no-op, not an error.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub cancelled: bool,
    pub status: StatusReport,
}
