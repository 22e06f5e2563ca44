mod accel;
mod climate;
mod config;
mod modem;
mod mqtt;
mod wifi;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use accel::Mpu6050;
use climate::Dht22Sensor;
use config::SystemConfig;
use esp_idf_hal::{
    delay::FreeRtos,
    gpio::{AnyIOPin, IOPin, PinDriver, Pull},
    i2c::{I2cConfig, I2cDriver},
    peripherals::Peripherals,
    uart::{config::Config, UartDriver},
    units::Hertz,
};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};
use log::{error, info, warn};
use modem::ModemUart;
use mqtt::MqttClient;
use trackbox::{Clock, CommandSequencer, ControlCommand, Interval, TrackerContext};
use wifi::WifiManager;

/// Main loop pacing (ms)
const LOOP_DELAY_MS: u32 = 10;

/// Milliseconds since boot from the ESP high-resolution timer
struct EspClock;

impl Clock for EspClock {
    fn now_ms(&self) -> u32 {
        // truncation wraps like any u32 millisecond counter
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() } / 1000) as u32
    }
}

fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    if let Err(e) = run() {
        error!("Fatal: {}", e);
    }
    halt();
}

/// Park the main task forever after an unrecoverable error
fn halt() -> ! {
    error!("System halted");
    loop {
        FreeRtos::delay_ms(1000);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SystemConfig::from_env();
    let clock = EspClock;

    info!("=== Trackbox ({}) ===", config.device_id);
    info!(
        "SSID: {}, Broker: {}, Telemetry every {} ms",
        config.network.wifi_ssid, config.network.mqtt_broker, config.telemetry.interval_ms
    );

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take().ok();

    // Accelerometer failure is fatal
    info!("Initializing MPU-6050");
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio4,
        peripherals.pins.gpio5,
        &I2cConfig::new().baudrate(Hertz(400_000)),
    )?;
    let mut accel = match Mpu6050::new(i2c) {
        Ok(a) => a,
        Err(e) => {
            error!("MPU-6050 init failed: {}", e);
            halt();
        }
    };

    let mut climate = Dht22Sensor::new(peripherals.pins.gpio10.downgrade())?;

    let mut button = PinDriver::input(peripherals.pins.gpio9)?;
    button.set_pull(Pull::Up)?;
    let mut lock_output = PinDriver::output(peripherals.pins.gpio3)?;
    lock_output.set_low()?;

    info!("Connecting to WiFi: {}", config.network.wifi_ssid);
    let mut wifi = WifiManager::new(peripherals.modem, sysloop, nvs)?;
    if let Err(e) = wifi.connect(config.network.wifi_ssid, config.network.wifi_password) {
        error!("WiFi failed: {}", e);
        halt();
    }

    let clear_requested = Arc::new(AtomicBool::new(false));
    let mut mqtt_opt = match MqttClient::new(
        config.network.mqtt_broker,
        config.device_id,
        config.network.control_topic,
        clear_requested.clone(),
    ) {
        Ok(m) => Some(m),
        Err(e) => {
            warn!("MQTT failed, running without telemetry: {}", e);
            None
        }
    };

    info!("Initializing modem UART at {} baud", config.modem.baud);
    let uart = UartDriver::new(
        peripherals.uart1,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &Config::new().baudrate(Hertz(config.modem.baud)),
    )?;
    let mut modem = ModemUart::new(uart);

    let now = clock.now_ms();
    let mut ctx = TrackerContext::new(config.tracker(), now);
    let mut sequencer = CommandSequencer::new(config.sequencer(), now);

    let report = sequencer.bring_up(&mut modem, &clock, &mut ctx);
    info!(
        "Modem bring-up: {} lines, {} send failures, {} rejected",
        report.lines, report.send_failures, report.rejected
    );

    let mut telemetry_timer = Interval::new(config.telemetry.interval_ms, clock.now_ms());

    info!("Entering main loop");
    loop {
        let now = clock.now_ms();

        sequencer.poll(&mut modem, &mut ctx, now);

        match ctx.poll_motion(&mut accel, now) {
            Ok(Some(tick)) if tick.alert_raised => warn!("ALERT: motion detected while locked"),
            Ok(_) => {}
            Err(e) => warn!("Accelerometer read failed: {}", e),
        }

        ctx.poll_climate(&mut climate, now);

        if let Some(locked) = ctx.on_button(button.is_high(), now) {
            let driven = if locked {
                lock_output.set_high()
            } else {
                lock_output.set_low()
            };
            if let Err(e) = driven {
                warn!("Lock actuator: {:?}", e);
            }
        }

        if clear_requested.swap(false, Ordering::SeqCst) {
            ctx.apply_control(&ControlCommand::CLEAR_ALERT);
        }

        if let Some(mqtt) = mqtt_opt.as_mut() {
            mqtt.maintain();

            if telemetry_timer.poll(now) {
                if !wifi.is_connected() || !mqtt.is_connected() {
                    warn!("Link down, telemetry skipped");
                } else {
                    match ctx.telemetry(config.device_id, now).to_json() {
                        Ok(payload) => {
                            if let Err(e) = mqtt.publish(config.network.telemetry_topic, &payload)
                            {
                                warn!("Telemetry publish failed: {:?}", e);
                            }
                        }
                        Err(e) => warn!("Telemetry encode failed: {}", e),
                    }
                }
            }
        }

        FreeRtos::delay_ms(LOOP_DELAY_MS);
    }
}
