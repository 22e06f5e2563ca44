//! Tracker state shared by every loop step
//!
//! One owned value holds the last known GPS fix, the motion detector, the
//! lock/alert latch and the latest climate reading. The main loop passes it
//! by `&mut` to each step; nothing else keeps tracker state.

use log::{info, warn};
use simcom_gps::{dispatch, Dispatch, GpsState, HemispherePolicy};

use crate::lock::{LockAlert, LockConfig};
use crate::motion::{MotionConfig, MotionDetector};
use crate::sensors::{AccelSample, Accelerometer, ClimateReading, ClimateSensor, SensorError};
use crate::telemetry::{ControlCommand, TelemetryRecord};
use crate::timer::Interval;

/// Default climate sampling period (ms)
pub const DEFAULT_CLIMATE_PERIOD_MS: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackerConfig {
    pub hemisphere: HemispherePolicy,
    pub motion: MotionConfig,
    pub lock: LockConfig,
    pub climate_period_ms: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hemisphere: HemispherePolicy::default(),
            motion: MotionConfig::default(),
            lock: LockConfig::default(),
            climate_period_ms: DEFAULT_CLIMATE_PERIOD_MS,
        }
    }
}

/// Result of one motion tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionTick {
    pub motion: bool,
    /// This tick latched the alert
    pub alert_raised: bool,
}

pub struct TrackerContext {
    gps: GpsState,
    hemisphere: HemispherePolicy,
    motion: MotionDetector,
    motion_timer: Interval,
    lock: LockAlert,
    climate: Option<ClimateReading>,
    climate_timer: Interval,
}

impl TrackerContext {
    pub fn new(config: TrackerConfig, now_ms: u32) -> Self {
        Self {
            gps: GpsState::new(),
            hemisphere: config.hemisphere,
            motion: MotionDetector::new(config.motion),
            motion_timer: Interval::new(config.motion.period_ms, now_ms),
            lock: LockAlert::new(config.lock),
            climate: None,
            climate_timer: Interval::new(config.climate_period_ms, now_ms),
        }
    }

    pub fn gps(&self) -> &GpsState {
        &self.gps
    }

    pub fn lock(&self) -> &LockAlert {
        &self.lock
    }

    pub fn motion(&self) -> bool {
        self.motion.motion()
    }

    pub fn climate(&self) -> Option<ClimateReading> {
        self.climate
    }

    /// Classify one modem line and fold it into the GPS state
    pub fn handle_modem_line(&mut self, line: &str) -> Dispatch {
        let outcome = dispatch(line, &mut self.gps, &self.hemisphere);

        if let Dispatch::FixUpdated { satellites } = outcome {
            let fix = self.gps.last_fix();
            info!(
                "GPS fix: {:.6}, {:.6} ({} satellites)",
                fix.latitude, fix.longitude, satellites
            );
        }

        outcome
    }

    /// Sample the accelerometer if the motion period has elapsed.
    ///
    /// Returns `Ok(None)` when the period has not elapsed yet. A failed read
    /// skips the tick and leaves the baseline untouched.
    pub fn poll_motion<A: Accelerometer>(
        &mut self,
        accel: &mut A,
        now_ms: u32,
    ) -> Result<Option<MotionTick>, SensorError> {
        if !self.motion_timer.poll(now_ms) {
            return Ok(None);
        }

        let sample = accel.read()?;
        Ok(Some(self.on_accel_sample(sample)))
    }

    /// Run one motion tick on an already-read sample
    pub fn on_accel_sample(&mut self, sample: AccelSample) -> MotionTick {
        let motion = self.motion.update(sample);
        let alert_raised = self.lock.on_motion(motion);
        MotionTick {
            motion,
            alert_raised,
        }
    }

    /// Sample the climate sensor if its period has elapsed.
    ///
    /// A failed read is logged and the previous reading kept.
    pub fn poll_climate<S: ClimateSensor>(&mut self, sensor: &mut S, now_ms: u32) -> bool {
        if !self.climate_timer.poll(now_ms) {
            return false;
        }

        match sensor.read() {
            Ok(reading) => {
                self.set_climate(reading);
                true
            }
            Err(e) => {
                warn!("Failed to read DHT22: {}", e);
                false
            }
        }
    }

    pub fn set_climate(&mut self, reading: ClimateReading) {
        self.climate = Some(reading);
    }

    /// Feed the lock button level. Returns the new lock state on a toggle.
    pub fn on_button(&mut self, level_high: bool, now_ms: u32) -> Option<bool> {
        self.lock.on_button(level_high, now_ms)
    }

    /// Apply a decoded control command. Returns `true` if an alert was cleared.
    pub fn apply_control(&mut self, command: &ControlCommand) -> bool {
        command.clears_alert() && self.lock.clear_alert()
    }

    /// Snapshot the current state for publishing
    pub fn telemetry(&self, device: &str, uptime_ms: u32) -> TelemetryRecord {
        let fix = self.gps.last_fix();

        TelemetryRecord {
            device: device.to_string(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            altitude: fix.altitude,
            satellites: fix.satellites,
            gps_valid: self.gps.has_fix(),
            date: fix.timestamp.map(|ts| ts.date().to_string()),
            time: fix.timestamp.map(|ts| ts.time().to_string()),
            temperature: self.climate.map(|c| c.temperature_c),
            humidity: self.climate.map(|c| c.humidity_pct),
            motion: self.motion.motion(),
            locked: self.lock.locked(),
            alert: self.lock.alert(),
            uptime_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str =
        "+CGPSINF: 0,2336.925300,4634.237600,760.600000,20250610122555.000,0,12,1.055640,24.139999";

    struct FixedAccel(AccelSample);

    impl Accelerometer for FixedAccel {
        fn read(&mut self) -> Result<AccelSample, SensorError> {
            Ok(self.0)
        }
    }

    struct FailingClimate;

    impl ClimateSensor for FailingClimate {
        fn read(&mut self) -> Result<ClimateReading, SensorError> {
            Err(SensorError::Timeout)
        }
    }

    #[test]
    fn test_telemetry_before_fix() {
        let ctx = TrackerContext::new(TrackerConfig::default(), 0);
        let record = ctx.telemetry("dev", 10);

        assert!(!record.gps_valid);
        assert_eq!(record.satellites, 0);
        assert!(record.date.is_none());
        assert!(record.temperature.is_none());
        assert_eq!(record.uptime_ms, 10);
    }

    #[test]
    fn test_telemetry_after_fix() {
        let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
        ctx.handle_modem_line(VALID);
        ctx.set_climate(ClimateReading {
            temperature_c: 21.5,
            humidity_pct: 40.0,
        });

        let record = ctx.telemetry("dev", 0);
        assert!(record.gps_valid);
        assert_eq!(record.satellites, 12);
        assert!((record.latitude + 23.615421).abs() < 1e-5);
        assert_eq!(record.date.as_deref(), Some("10/06/2025"));
        assert_eq!(record.time.as_deref(), Some("12:25:55"));
        assert_eq!(record.temperature, Some(21.5));
    }

    #[test]
    fn test_poll_motion_respects_period() {
        let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
        let mut accel = FixedAccel(AccelSample::new(0.0, 0.0, 1.0));

        assert_eq!(ctx.poll_motion(&mut accel, 1999), Ok(None));
        let tick = ctx.poll_motion(&mut accel, 2000).unwrap().unwrap();
        assert!(!tick.motion);
        assert_eq!(ctx.poll_motion(&mut accel, 3000), Ok(None));
    }

    #[test]
    fn test_failed_climate_read_keeps_previous() {
        let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
        let previous = ClimateReading {
            temperature_c: 18.0,
            humidity_pct: 55.0,
        };
        ctx.set_climate(previous);

        assert!(!ctx.poll_climate(&mut FailingClimate, 2000));
        assert_eq!(ctx.climate(), Some(previous));
    }

    #[test]
    fn test_control_only_clears_on_false() {
        let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
        ctx.on_button(false, 0);
        ctx.on_accel_sample(AccelSample::new(0.0, 0.0, 1.0));
        assert!(ctx.on_accel_sample(AccelSample::new(0.0, 0.0, 0.0)).alert_raised);

        assert!(!ctx.apply_control(&ControlCommand { alert: Some(true) }));
        assert!(!ctx.apply_control(&ControlCommand { alert: None }));
        assert!(ctx.lock().alert());

        assert!(ctx.apply_control(&ControlCommand { alert: Some(false) }));
        assert!(!ctx.lock().alert());
    }
}
