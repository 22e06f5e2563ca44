/// Sensor abstraction layer for hardware independence
/// Lets the tracker logic run against real drivers or scripted test doubles
use core::fmt;

/// One accelerometer sample in g
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccelSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl AccelSample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Largest absolute per-axis difference to `other`
    pub fn max_axis_delta(&self, other: &AccelSample) -> f32 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

/// Temperature/humidity measurement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

impl From<dht22::Reading> for ClimateReading {
    fn from(reading: dht22::Reading) -> Self {
        Self {
            temperature_c: reading.temperature_c,
            humidity_pct: reading.humidity_pct,
        }
    }
}

/// Errors that can occur when reading sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    IoError,
    /// Device answered with an unexpected identity
    WrongDevice { found: u8 },
    Timeout,
    Checksum,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorError::IoError => write!(f, "bus I/O error"),
            SensorError::WrongDevice { found } => {
                write!(f, "unexpected device id {:#04x}", found)
            }
            SensorError::Timeout => write!(f, "sensor timed out"),
            SensorError::Checksum => write!(f, "checksum mismatch"),
        }
    }
}

impl std::error::Error for SensorError {}

impl From<dht22::Dht22Error> for SensorError {
    fn from(error: dht22::Dht22Error) -> Self {
        match error {
            dht22::Dht22Error::Timeout => SensorError::Timeout,
            dht22::Dht22Error::Checksum { .. } => SensorError::Checksum,
        }
    }
}

/// Abstraction for accelerometers
/// Implementations: MPU-6050, LIS3DH, etc.
pub trait Accelerometer {
    fn read(&mut self) -> Result<AccelSample, SensorError>;
}

/// Abstraction for temperature/humidity sensors
/// Implementations: DHT22
pub trait ClimateSensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_axis_delta() {
        let a = AccelSample::new(0.0, 0.0, 1.0);
        let b = AccelSample::new(0.1, -0.3, 0.95);
        assert!((a.max_axis_delta(&b) - 0.3).abs() < 1e-6);
        assert!((b.max_axis_delta(&a) - 0.3).abs() < 1e-6);
        assert_eq!(a.max_axis_delta(&a), 0.0);
    }

    #[test]
    fn test_dht22_error_mapping() {
        assert_eq!(SensorError::from(dht22::Dht22Error::Timeout), SensorError::Timeout);
        assert_eq!(
            SensorError::from(dht22::Dht22Error::Checksum {
                expected: 1,
                actual: 2
            }),
            SensorError::Checksum
        );
    }
}
