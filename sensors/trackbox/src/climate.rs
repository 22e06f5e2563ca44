/// DHT22 on a single open-drain GPIO
///
/// The pin is bit-banged: host start pulse, sensor response, then 40 high
/// pulses whose widths are handed to the `dht22` decoder.
use dht22::{FRAME_BITS, LEVEL_TIMEOUT_US, START_LOW_MS};
use esp_idf_hal::delay::{Ets, FreeRtos};
use esp_idf_hal::gpio::{AnyIOPin, InputOutput, PinDriver};
use esp_idf_svc::sys::EspError;
use trackbox::{ClimateReading, ClimateSensor, SensorError};

pub struct Dht22Sensor {
    pin: PinDriver<'static, AnyIOPin, InputOutput>,
}

impl Dht22Sensor {
    pub fn new(pin: AnyIOPin) -> Result<Self, EspError> {
        let mut pin = PinDriver::input_output_od(pin)?;
        pin.set_high()?;
        Ok(Self { pin })
    }

    /// Wait until the line reaches `high`, returning the time waited (µs)
    fn wait_for(&self, high: bool) -> Result<u32, SensorError> {
        let start = now_us();
        loop {
            let waited = (now_us() - start) as u32;
            if self.pin.is_high() == high {
                return Ok(waited);
            }
            if waited > LEVEL_TIMEOUT_US {
                return Err(SensorError::Timeout);
            }
        }
    }

    fn read_pulses(&mut self) -> Result<[u32; FRAME_BITS], SensorError> {
        // start signal
        self.pin.set_low().map_err(|_| SensorError::IoError)?;
        FreeRtos::delay_ms(START_LOW_MS);
        self.pin.set_high().map_err(|_| SensorError::IoError)?;
        Ets::delay_us(30);

        // response: 80 µs low, 80 µs high
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        let mut pulses = [0u32; FRAME_BITS];
        for pulse in pulses.iter_mut() {
            self.wait_for(true)?;
            *pulse = self.wait_for(false)?;
        }

        Ok(pulses)
    }
}

fn now_us() -> i64 {
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

impl ClimateSensor for Dht22Sensor {
    fn read(&mut self) -> Result<ClimateReading, SensorError> {
        let pulses = self.read_pulses();
        // release the bus whatever happened
        self.pin.set_high().map_err(|_| SensorError::IoError)?;

        let reading = dht22::decode_pulses(&pulses?)?;
        Ok(reading.into())
    }
}
