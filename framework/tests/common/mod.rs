//! Scripted modem and manual clock shared by the integration tests

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use trackbox::{Clock, LineTransport};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Clock advanced by hand or by the modem while it "waits"
#[derive(Clone)]
pub struct ManualClock(Rc<Cell<u32>>);

impl ManualClock {
    pub fn starting_at(now_ms: u32) -> Self {
        Self(Rc::new(Cell::new(now_ms)))
    }

    pub fn set(&self, now_ms: u32) {
        self.0.set(now_ms);
    }

    pub fn advance(&self, ms: u32) {
        self.0.set(self.0.get().wrapping_add(ms));
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

/// Modem double: replies are queued when their command is sent, and an
/// empty read consumes the whole timeout on the shared clock.
pub struct MockModem {
    clock: ManualClock,
    inbox: VecDeque<String>,
    current: String,
    replies: HashMap<&'static str, Vec<&'static str>>,
    pub sent: Vec<String>,
    pub fail_sends: bool,
}

impl MockModem {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inbox: VecDeque::new(),
            current: String::new(),
            replies: HashMap::new(),
            sent: Vec::new(),
            fail_sends: false,
        }
    }

    pub fn reply(&mut self, command: &'static str, lines: &[&'static str]) {
        self.replies.insert(command, lines.to_vec());
    }

    pub fn push_line(&mut self, line: &str) {
        self.inbox.push_back(line.to_string());
    }

    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    pub fn sent_count(&self, command: &str) -> usize {
        self.sent.iter().filter(|c| c.as_str() == command).count()
    }
}

impl LineTransport for MockModem {
    type Error = &'static str;

    fn send_line(&mut self, command: &str) -> Result<(), Self::Error> {
        self.sent.push(command.to_string());
        if self.fail_sends {
            return Err("uart write failed");
        }
        if let Some(lines) = self.replies.get(command) {
            self.inbox.extend(lines.iter().map(|l| l.to_string()));
        }
        Ok(())
    }

    fn read_line(&mut self, timeout_ms: u32) -> Option<&str> {
        match self.inbox.pop_front() {
            Some(line) => {
                self.current = line;
                Some(&self.current)
            }
            None => {
                self.clock.advance(timeout_ms);
                None
            }
        }
    }
}
