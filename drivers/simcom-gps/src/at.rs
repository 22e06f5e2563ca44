//! AT command set for the modem GPS engine
//!
//! Commands are plain ASCII lines; the transport appends `\r\n`.

/// Liveness check
pub const AT_PING: &str = "AT";
/// Power on the GPS engine
pub const GPS_POWER_ON: &str = "AT+CGPSPWR=1";
/// Standalone (non-assisted) GPS mode
pub const GPS_STANDALONE_MODE: &str = "AT+CGPSMD=1";
/// Cold start the GPS engine
pub const GPS_COLD_RESET: &str = "AT+CGPSRST=0";
/// Request the current fix as a `+CGPSINF` line
pub const FIX_REQUEST: &str = "AT+CGPSINF=0";
/// Query fix status (`+CGPSSTATUS: ...`)
pub const STATUS_QUERY: &str = "AT+CGPSSTATUS?";

/// Extra time to collect responses after a step's settle time
pub const RESPONSE_GRACE_MS: u32 = 500;

/// One command of the startup sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BringUpStep {
    pub name: &'static str,
    pub command: &'static str,
    /// Time the modem needs before the next command (ms)
    pub settle_ms: u32,
}

impl BringUpStep {
    /// How long responses to this step are collected
    pub fn window_ms(&self) -> u32 {
        self.settle_ms + RESPONSE_GRACE_MS
    }
}

/// Startup sequence, run once in order
pub const BRING_UP_SEQUENCE: [BringUpStep; 4] = [
    BringUpStep {
        name: "modem liveness",
        command: AT_PING,
        settle_ms: 1000,
    },
    BringUpStep {
        name: "GPS power on",
        command: GPS_POWER_ON,
        settle_ms: 2000,
    },
    BringUpStep {
        name: "standalone mode",
        command: GPS_STANDALONE_MODE,
        settle_ms: 1000,
    },
    BringUpStep {
        name: "cold reset",
        command: GPS_COLD_RESET,
        settle_ms: 3000,
    },
];

/// Final result code of an AT command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    Ok,
    Error,
}

impl ResultCode {
    /// Recognize `OK`, `ERROR` and `+CME ERROR: n` lines
    pub fn from_line(line: &str) -> Option<Self> {
        match line {
            "OK" => Some(ResultCode::Ok),
            "ERROR" => Some(ResultCode::Error),
            _ if line.starts_with("+CME ERROR") => Some(ResultCode::Error),
            _ => None,
        }
    }
}
