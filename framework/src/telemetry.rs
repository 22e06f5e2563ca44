//! Outbound telemetry record and inbound control command
//!
//! Both travel as JSON over MQTT. The telemetry record is flat so that
//! dashboards can map fields directly; absent optional values are omitted
//! rather than sent as `null`.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Default MQTT topic for telemetry
pub const TELEMETRY_TOPIC: &str = "trackbox/telemetry";

/// Default MQTT topic for control commands
pub const CONTROL_TOPIC: &str = "trackbox/control";

/// One telemetry snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub device: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    pub satellites: u32,
    pub gps_valid: bool,
    /// `DD/MM/YYYY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f32>,
    pub motion: bool,
    pub locked: bool,
    pub alert: bool,
    pub uptime_ms: u32,
}

impl TelemetryRecord {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Inbound control message, e.g. `{"alert": false}`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ControlCommand {
    #[serde(default)]
    pub alert: Option<bool>,
}

impl ControlCommand {
    /// Equivalent of `{"alert": false}`
    pub const CLEAR_ALERT: Self = Self { alert: Some(false) };

    pub fn from_json(payload: &[u8]) -> Result<Self, ControlError> {
        serde_json::from_slice(payload).map_err(ControlError::Malformed)
    }

    /// Only an explicit `"alert": false` clears the alert
    pub fn clears_alert(&self) -> bool {
        self.alert == Some(false)
    }
}

#[derive(Debug)]
pub enum ControlError {
    Malformed(serde_json::Error),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::Malformed(e) => write!(f, "malformed control payload: {}", e),
        }
    }
}

impl std::error::Error for ControlError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ControlError::Malformed(e) => Some(e),
        }
    }
}
