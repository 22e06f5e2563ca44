/// Configuration management for the trackbox firmware
/// Defaults are baked in; network settings are overridden at compile time
use trackbox::telemetry::{CONTROL_TOPIC, TELEMETRY_TOPIC};
use trackbox::{HemispherePolicy, LockConfig, MotionConfig, SequencerConfig, TrackerConfig};

/// Network configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network to connect to (station mode only)
    pub wifi_ssid: &'static str,
    pub wifi_password: &'static str,
    /// MQTT broker URL
    pub mqtt_broker: &'static str,
    pub telemetry_topic: &'static str,
    pub control_topic: &'static str,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            wifi_ssid: "Trackbox",
            wifi_password: "trackbox123",
            // Placeholder - MUST set via environment variables
            mqtt_broker: "mqtt://192.168.1.100:1883",
            telemetry_topic: TELEMETRY_TOPIC,
            control_topic: CONTROL_TOPIC,
        }
    }
}

/// Cellular modem (GPS) configuration
#[derive(Debug, Clone, Copy)]
pub struct ModemConfig {
    pub baud: u32,
    pub fix_interval_ms: u32,
    pub status_interval_ms: u32,
}

impl Default for ModemConfig {
    fn default() -> Self {
        let sequencer = SequencerConfig::default();
        Self {
            baud: 9600,
            fix_interval_ms: sequencer.fix_interval_ms,
            status_interval_ms: sequencer.status_interval_ms,
        }
    }
}

/// DHT22 sampling
#[derive(Debug, Clone, Copy)]
pub struct ClimateConfig {
    pub period_ms: u32,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            period_ms: dht22::MIN_READ_INTERVAL_MS,
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Copy)]
pub struct TelemetryConfig {
    pub interval_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { interval_ms: 5000 }
    }
}

/// Complete system configuration
#[derive(Debug, Clone)]
pub struct SystemConfig {
    pub device_id: &'static str,
    pub network: NetworkConfig,
    pub modem: ModemConfig,
    pub hemisphere: HemispherePolicy,
    pub motion: MotionConfig,
    pub lock: LockConfig,
    pub climate: ClimateConfig,
    pub telemetry: TelemetryConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            device_id: "trackbox-01",
            network: NetworkConfig::default(),
            modem: ModemConfig::default(),
            hemisphere: HemispherePolicy::default(),
            motion: MotionConfig::default(),
            lock: LockConfig::default(),
            climate: ClimateConfig::default(),
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Create configuration from environment variables (compile-time)
    ///
    /// ```bash
    /// export WIFI_SSID="YourNetworkName"
    /// export WIFI_PASSWORD="YourPassword"
    /// export MQTT_BROKER="mqtt://192.168.1.100:1883"
    /// export DEVICE_ID="truck-07"
    /// export GPS_HEMISPHERE="none"   # unsigned coordinates outside South America
    /// cargo build --release
    /// ```
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ssid) = option_env!("WIFI_SSID") {
            config.network.wifi_ssid = ssid;
        }
        if let Some(password) = option_env!("WIFI_PASSWORD") {
            config.network.wifi_password = password;
        }
        if let Some(broker) = option_env!("MQTT_BROKER") {
            config.network.mqtt_broker = broker;
        }
        if let Some(id) = option_env!("DEVICE_ID") {
            config.device_id = id;
        }
        if let Some(hemisphere) = option_env!("GPS_HEMISPHERE") {
            config.hemisphere = match hemisphere.to_lowercase().as_str() {
                "none" | "off" | "unsigned" => HemispherePolicy::NONE,
                _ => HemispherePolicy::SOUTH_WEST,
            };
        }

        config
    }

    pub fn tracker(&self) -> TrackerConfig {
        TrackerConfig {
            hemisphere: self.hemisphere,
            motion: self.motion,
            lock: self.lock,
            climate_period_ms: self.climate.period_ms,
        }
    }

    pub fn sequencer(&self) -> SequencerConfig {
        SequencerConfig {
            fix_interval_ms: self.modem.fix_interval_ms,
            status_interval_ms: self.modem.status_interval_ms,
            ..SequencerConfig::default()
        }
    }
}
