/// MPU-6050 accelerometer over I2C
use esp_idf_hal::delay::BLOCK;
use esp_idf_hal::i2c::I2cDriver;
use log::info;
use trackbox::{AccelSample, Accelerometer, SensorError};

const ADDRESS: u8 = 0x68;

const REG_ACCEL_CONFIG: u8 = 0x1C;
const REG_ACCEL_XOUT_H: u8 = 0x3B;
const REG_PWR_MGMT_1: u8 = 0x6B;
const REG_WHO_AM_I: u8 = 0x75;

const WHO_AM_I_VALUE: u8 = 0x68;

/// LSB per g at ±2 g full scale
const LSB_PER_G: f32 = 16384.0;

pub struct Mpu6050 {
    i2c: I2cDriver<'static>,
}

impl Mpu6050 {
    /// Probe, wake and configure the sensor for ±2 g
    pub fn new(mut i2c: I2cDriver<'static>) -> Result<Self, SensorError> {
        let mut id = [0u8; 1];
        i2c.write_read(ADDRESS, &[REG_WHO_AM_I], &mut id, BLOCK)
            .map_err(|_| SensorError::IoError)?;
        if id[0] != WHO_AM_I_VALUE {
            return Err(SensorError::WrongDevice { found: id[0] });
        }

        i2c.write(ADDRESS, &[REG_PWR_MGMT_1, 0x00], BLOCK)
            .map_err(|_| SensorError::IoError)?;
        i2c.write(ADDRESS, &[REG_ACCEL_CONFIG, 0x00], BLOCK)
            .map_err(|_| SensorError::IoError)?;

        info!("MPU-6050 ready (±2 g)");
        Ok(Self { i2c })
    }
}

impl Accelerometer for Mpu6050 {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(ADDRESS, &[REG_ACCEL_XOUT_H], &mut raw, BLOCK)
            .map_err(|_| SensorError::IoError)?;

        let axis = |hi: usize| f32::from(i16::from_be_bytes([raw[hi], raw[hi + 1]])) / LSB_PER_G;
        Ok(AccelSample::new(axis(0), axis(2), axis(4)))
    }
}
