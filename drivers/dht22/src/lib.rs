//! DHT22 Temperature/Humidity Frame Decoder
//!
//! Pure Rust decoding of the DHT22 (AM2302) single-wire protocol. The pin
//! timing itself is platform code; this crate turns the measured high-pulse
//! widths into bytes and the bytes into a checked reading.
//!
//! # Protocol
//!
//! - Host pulls the line low for at least 1 ms, then releases it
//! - Sensor answers 80 µs low, 80 µs high
//! - 40 bits follow, each ~50 µs low then a high pulse whose width is the
//!   bit value (~26-28 µs = 0, ~70 µs = 1)
//! - Frame: humidity (2 bytes), temperature (2 bytes), checksum
//!
//! # Example
//!
//! ```
//! use dht22::decode;
//!
//! // 65.2 %RH, 35.1 °C
//! let reading = decode([0x02, 0x8C, 0x01, 0x5F, 0xEE]).unwrap();
//! assert!((reading.humidity_pct - 65.2).abs() < 0.01);
//! assert!((reading.temperature_c - 35.1).abs() < 0.01);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

use core::fmt;

#[cfg(feature = "logging")]
use log::warn;

/// High pulses longer than this are a 1 bit (µs)
pub const BIT_THRESHOLD_US: u32 = 50;

/// Bits in one frame
pub const FRAME_BITS: usize = 40;

/// Bytes in one frame
pub const FRAME_BYTES: usize = 5;

/// Host start signal low time (ms)
pub const START_LOW_MS: u32 = 18;

/// Longest wait for any single level change (µs)
pub const LEVEL_TIMEOUT_US: u32 = 100;

/// Minimum time between reads recommended by the datasheet (ms)
pub const MIN_READ_INTERVAL_MS: u32 = 2000;

/// One temperature/humidity measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Degrees Celsius
    pub temperature_c: f32,
    /// Relative humidity in percent
    pub humidity_pct: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dht22Error {
    /// Sensor did not change level in time
    Timeout,
    /// Frame checksum mismatch
    Checksum { expected: u8, actual: u8 },
}

impl fmt::Display for Dht22Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dht22Error::Timeout => write!(f, "timed out waiting for sensor"),
            Dht22Error::Checksum { expected, actual } => write!(
                f,
                "checksum mismatch: expected {:#04x}, got {:#04x}",
                expected, actual
            ),
        }
    }
}

/// Pack measured high-pulse widths (µs, MSB first) into frame bytes
pub fn frame_from_pulses(pulses: &[u32; FRAME_BITS]) -> [u8; FRAME_BYTES] {
    let mut frame = [0u8; FRAME_BYTES];

    for (i, &width) in pulses.iter().enumerate() {
        frame[i / 8] <<= 1;
        if width > BIT_THRESHOLD_US {
            frame[i / 8] |= 1;
        }
    }

    frame
}

/// Low byte of the sum of the four data bytes
pub fn checksum(frame: &[u8; FRAME_BYTES]) -> u8 {
    frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Decode a checked frame into a reading
pub fn decode(frame: [u8; FRAME_BYTES]) -> Result<Reading, Dht22Error> {
    let expected = checksum(&frame);
    if expected != frame[4] {
        #[cfg(feature = "logging")]
        warn!("DHT22 checksum mismatch: {:02x?}", frame);
        return Err(Dht22Error::Checksum {
            expected,
            actual: frame[4],
        });
    }

    let humidity_raw = u16::from_be_bytes([frame[0], frame[1]]);
    let temperature_raw = u16::from_be_bytes([frame[2], frame[3]]);

    let mut temperature_c = f32::from(temperature_raw & 0x7FFF) / 10.0;
    if temperature_raw & 0x8000 != 0 {
        temperature_c = -temperature_c;
    }

    Ok(Reading {
        temperature_c,
        humidity_pct: f32::from(humidity_raw) / 10.0,
    })
}

/// Convenience for `decode(frame_from_pulses(pulses))`
pub fn decode_pulses(pulses: &[u32; FRAME_BITS]) -> Result<Reading, Dht22Error> {
    decode(frame_from_pulses(pulses))
}
