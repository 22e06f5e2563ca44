//! Trackbox Framework
//!
//! Hardware-independent logic of a cargo/vehicle tracker: GPS over a
//! cellular modem's AT interface, motion detection, a lock with a theft
//! alert latch, and MQTT telemetry records. Everything here runs on the
//! host; the firmware only supplies the transport, sensors and clock.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │  Firmware (UART, I2C, GPIO, WiFi, MQTT)  │
//! ├──────────────────────────────────────────┤
//! │  CommandSequencer  │  TrackerContext     │
//! │  (AT scheduling)   │  (GPS, motion, lock)│
//! ├──────────────────────────────────────────┤
//! │  simcom-gps  │  dht22  │  timers         │
//! └──────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use trackbox::{CommandSequencer, SequencerConfig, TrackerConfig, TrackerContext};
//!
//! let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
//! let mut sequencer = CommandSequencer::new(SequencerConfig::default(), 0);
//!
//! // sequencer.bring_up(&mut modem, &clock, &mut ctx);
//! // loop {
//! //     let now = clock.now_ms();
//! //     sequencer.poll(&mut modem, &mut ctx, now);
//! //     ctx.poll_motion(&mut accel, now)?;
//! //     ctx.on_button(button.is_high(), now);
//! // }
//! ```
//!
//! ## Modules
//!
//! - [`timer`] - Clock trait and rollover-safe intervals
//! - [`sensors`] - Accelerometer and climate sensor traits
//! - [`motion`] - Sample-to-sample motion detector
//! - [`lock`] - Button debouncer and lock/alert latch
//! - [`sequencer`] - Modem bring-up and periodic AT commands
//! - [`context`] - Tracker state and per-step entry points
//! - [`telemetry`] - JSON telemetry record and control command

pub mod context;
pub mod lock;
pub mod motion;
pub mod sensors;
pub mod sequencer;
pub mod telemetry;
pub mod timer;

// Re-export commonly used types
pub use context::{MotionTick, TrackerConfig, TrackerContext};
pub use lock::{Debouncer, LockAlert, LockConfig};
pub use motion::{MotionConfig, MotionDetector};
pub use sensors::{AccelSample, Accelerometer, ClimateReading, ClimateSensor, SensorError};
pub use sequencer::{BringUpReport, CommandSequencer, PollReport, SequencerConfig};
pub use telemetry::{ControlCommand, ControlError, TelemetryRecord};
pub use timer::{Clock, Interval};

pub use simcom_gps::{Dispatch, GpsState, HemispherePolicy, LineTransport};
