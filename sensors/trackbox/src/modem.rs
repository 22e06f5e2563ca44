/// SIMCom modem on a UART, exposed as a line transport
use esp_idf_hal::delay::{TickType, NON_BLOCK};
use esp_idf_hal::uart::UartDriver;
use esp_idf_svc::sys::EspError;
use simcom_gps::{LineBuffer, LineTransport};

/// Longest single blocking UART read while waiting for a line (ms)
const READ_SLICE_MS: u64 = 10;

pub struct ModemUart {
    uart: UartDriver<'static>,
    line: LineBuffer,
}

impl ModemUart {
    pub fn new(uart: UartDriver<'static>) -> Self {
        Self {
            uart,
            line: LineBuffer::new(),
        }
    }
}

fn now_us() -> i64 {
    unsafe { esp_idf_svc::sys::esp_timer_get_time() }
}

impl LineTransport for ModemUart {
    type Error = EspError;

    fn send_line(&mut self, command: &str) -> Result<(), EspError> {
        self.uart.write(command.as_bytes())?;
        self.uart.write(b"\r\n")?;
        Ok(())
    }

    fn read_line(&mut self, timeout_ms: u32) -> Option<&str> {
        let start = now_us();
        let budget_us = i64::from(timeout_ms) * 1000;
        let slice = if timeout_ms == 0 {
            NON_BLOCK
        } else {
            TickType::new_millis(READ_SLICE_MS).ticks()
        };

        let mut byte = [0u8; 1];
        let mut complete = false;

        loop {
            match self.uart.read(&mut byte, slice) {
                Ok(1) => {
                    if self.line.feed_byte(byte[0]) {
                        complete = true;
                        break;
                    }
                }
                _ => {
                    if now_us() - start >= budget_us {
                        break;
                    }
                }
            }
        }

        if complete {
            Some(self.line.line())
        } else {
            None
        }
    }
}
