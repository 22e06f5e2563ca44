//! SIMCom GPS response parser
//!
//! Pure Rust handling of the GPS side of a SIMCom cellular modem driven over
//! an AT command UART. The modem answers fix requests with a vendor status
//! line (`+CGPSINF: ...`) and may also echo raw NMEA sentences; this crate
//! classifies those lines and folds them into a last-known-fix state.
//!
//! # Features
//!
//! - Bounded, allocation-free field splitting
//! - Vendor `SINF` sentence parsing with a configurable hemisphere policy
//! - NMEA `$GPGSV` satellite-count fallback
//! - Last-known-good fix preservation on bad reads
//! - Byte-to-line assembly for UART transports
//! - `no_std` compatible
//!
//! # Example
//!
//! ```
//! use simcom_gps::{dispatch, GpsState, HemispherePolicy};
//!
//! let mut gps = GpsState::new();
//! let policy = HemispherePolicy::default();
//!
//! dispatch(
//!     "SINF: 0,2336.925300,4634.237600,760.600000,20250610122555.000,0,12,1.055640,24.139999",
//!     &mut gps,
//!     &policy,
//! );
//!
//! assert!(gps.has_fix());
//! assert_eq!(gps.satellites(), 12);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod at;
pub mod classify;
pub mod nmea;
pub mod sinf;
pub mod transport;

use core::fmt;

pub use classify::{classify, dispatch, Dispatch, LineKind};
pub use sinf::{convert_sinf_coordinate, HemispherePolicy, SinfError, SinfReport};
pub use transport::{LineBuffer, LineTransport};

/// Length of the vendor date-time field (`YYYYMMDDHHMMSS`)
pub const TIMESTAMP_LEN: usize = 14;

/// UTC date-time as reported by the modem, kept in its raw digit form
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct GpsTimestamp {
    raw: [u8; TIMESTAMP_LEN],
}

impl GpsTimestamp {
    /// Parse the first 14 characters of a date-time field.
    ///
    /// Returns `None` when the field is shorter than 14 characters or any of
    /// the first 14 is not an ASCII digit. Trailing text such as the
    /// fractional `.000` seconds is ignored.
    pub fn parse(field: &str) -> Option<Self> {
        let bytes = field.as_bytes();
        if bytes.len() < TIMESTAMP_LEN {
            return None;
        }

        let mut raw = [0u8; TIMESTAMP_LEN];
        raw.copy_from_slice(&bytes[..TIMESTAMP_LEN]);

        if raw.iter().all(u8::is_ascii_digit) {
            Some(Self { raw })
        } else {
            None
        }
    }

    /// Raw 14-digit string
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.raw).unwrap_or("")
    }

    pub fn year(&self) -> u16 {
        self.number(0, 4) as u16
    }

    pub fn month(&self) -> u8 {
        self.number(4, 2) as u8
    }

    pub fn day(&self) -> u8 {
        self.number(6, 2) as u8
    }

    pub fn hour(&self) -> u8 {
        self.number(8, 2) as u8
    }

    pub fn minute(&self) -> u8 {
        self.number(10, 2) as u8
    }

    pub fn second(&self) -> u8 {
        self.number(12, 2) as u8
    }

    /// Date formatted as `DD/MM/YYYY`
    pub fn date(&self) -> DateDisplay<'_> {
        DateDisplay(self)
    }

    /// Time formatted as `HH:MM:SS`
    pub fn time(&self) -> TimeDisplay<'_> {
        TimeDisplay(self)
    }

    fn number(&self, start: usize, len: usize) -> u32 {
        self.raw[start..start + len]
            .iter()
            .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'))
    }
}

impl fmt::Debug for GpsTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GpsTimestamp({})", self.as_str())
    }
}

/// `DD/MM/YYYY` view of a [`GpsTimestamp`]
pub struct DateDisplay<'a>(&'a GpsTimestamp);

impl fmt::Display for DateDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}/{:04}", self.0.day(), self.0.month(), self.0.year())
    }
}

/// `HH:MM:SS` view of a [`GpsTimestamp`]
pub struct TimeDisplay<'a>(&'a GpsTimestamp);

impl fmt::Display for TimeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.0.hour(), self.0.minute(), self.0.second())
    }
}

/// Normalized GPS position solution
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixRecord {
    /// Fix status code from the vendor sentence, passed through untouched
    pub status: u32,
    /// Latitude in decimal degrees (negative = South)
    pub latitude: f64,
    /// Longitude in decimal degrees (negative = West)
    pub longitude: f64,
    /// Altitude in meters, absent when the modem left the field empty
    pub altitude: Option<f64>,
    /// UTC date-time of the fix
    pub timestamp: Option<GpsTimestamp>,
    /// Satellites used (0 until known)
    pub satellites: u32,
}

/// Last known GPS fix
///
/// Created all-zero at startup and only written by the sentence parsers in
/// this crate. A bad read never replaces a previously valid position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GpsState {
    fix: FixRecord,
    has_fix: bool,
}

impl GpsState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent fix (all zeros until the first valid sentence)
    pub fn last_fix(&self) -> &FixRecord {
        &self.fix
    }

    /// Whether a valid position has been received since startup
    pub fn has_fix(&self) -> bool {
        self.has_fix
    }

    pub fn satellites(&self) -> u32 {
        self.fix.satellites
    }

    /// Fold a parsed vendor sentence into the state.
    ///
    /// The satellite count is always taken; position fields only when the
    /// report carries a valid fix.
    pub fn apply(&mut self, report: &SinfReport) {
        self.fix.satellites = report.satellites;

        if let Some(position) = report.position {
            self.fix.status = position.status;
            self.fix.latitude = position.latitude;
            self.fix.longitude = position.longitude;
            self.fix.altitude = position.altitude;
            self.fix.timestamp = position.timestamp;
            self.has_fix = true;
        }
    }

    /// Adopt a satellite count from a secondary source.
    ///
    /// Only takes effect while no count is known yet. Returns `true` when
    /// the count was adopted.
    pub fn adopt_satellites(&mut self, satellites: u32) -> bool {
        if satellites > 0 && self.fix.satellites == 0 {
            self.fix.satellites = satellites;
            true
        } else {
            false
        }
    }
}
