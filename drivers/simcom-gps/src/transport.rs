//! Line-oriented modem transport

/// Longest response line kept; extra bytes are dropped
pub const LINE_CAPACITY: usize = 128;

/// Bidirectional text channel to the modem
///
/// Implemented over a UART on the device and over scripted queues in tests.
pub trait LineTransport {
    type Error: core::fmt::Debug;

    /// Send one command; the implementation appends `\r\n`
    fn send_line(&mut self, command: &str) -> Result<(), Self::Error>;

    /// Next complete, trimmed, non-empty line.
    ///
    /// Waits at most `timeout_ms` and returns `None` when nothing arrived.
    /// A timeout of 0 only returns what is already buffered.
    fn read_line(&mut self, timeout_ms: u32) -> Option<&str>;
}

/// Assembles a byte stream into lines
///
/// `\r` is ignored, `\n` ends a line. Empty lines are skipped.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    buf: [u8; LINE_CAPACITY],
    len: usize,
    complete: bool,
}

impl LineBuffer {
    pub const fn new() -> Self {
        Self {
            buf: [0; LINE_CAPACITY],
            len: 0,
            complete: false,
        }
    }

    /// Feed one byte. Returns `true` when it completed a non-empty line,
    /// which stays readable through [`line`](Self::line) until the next
    /// byte is fed.
    pub fn feed_byte(&mut self, byte: u8) -> bool {
        if self.complete {
            self.len = 0;
            self.complete = false;
        }

        match byte {
            b'\r' => false,
            b'\n' => {
                if self.line().is_empty() {
                    self.len = 0;
                    false
                } else {
                    self.complete = true;
                    true
                }
            }
            _ => {
                if self.len < LINE_CAPACITY {
                    self.buf[self.len] = byte;
                    self.len += 1;
                }
                false
            }
        }
    }

    /// Current line, trimmed. Invalid UTF-8 reads as empty.
    pub fn line(&self) -> &str {
        core::str::from_utf8(&self.buf[..self.len])
            .map(str::trim)
            .unwrap_or("")
    }
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new()
    }
}
