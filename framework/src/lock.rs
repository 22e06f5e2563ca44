/// Lock toggle and theft alert state machine
///
/// - `locked` flips on each debounced press of the lock button
/// - `alert` latches when motion is seen while locked
/// - only an external clear command resets `alert`; unlocking does not
use log::info;

use crate::timer::elapsed_ms;

/// Default button hold window after an accepted press (ms)
pub const DEFAULT_DEBOUNCE_MS: u32 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    pub debounce_ms: u32,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// Falling-edge detector for an active-low button with a hold window
///
/// The input idles HIGH (pull-up). A HIGH→LOW transition is accepted as a
/// press unless it falls inside the hold window of the previous accepted
/// press. The window is measured from the accepted edge.
#[derive(Debug, Clone, Copy)]
pub struct Debouncer {
    hold_ms: u32,
    last_high: bool,
    accepted_at: Option<u32>,
}

impl Debouncer {
    pub fn new(hold_ms: u32) -> Self {
        Self {
            hold_ms,
            last_high: true,
            accepted_at: None,
        }
    }

    /// Feed the current input level. Returns `true` for an accepted press.
    pub fn update(&mut self, level_high: bool, now_ms: u32) -> bool {
        let falling = self.last_high && !level_high;
        self.last_high = level_high;

        if !falling {
            return false;
        }

        if let Some(at) = self.accepted_at {
            if elapsed_ms(now_ms, at) < self.hold_ms {
                return false;
            }
        }

        self.accepted_at = Some(now_ms);
        true
    }
}

pub struct LockAlert {
    debouncer: Debouncer,
    locked: bool,
    alert: bool,
}

impl LockAlert {
    pub fn new(config: LockConfig) -> Self {
        Self {
            debouncer: Debouncer::new(config.debounce_ms),
            locked: false,
            alert: false,
        }
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn alert(&self) -> bool {
        self.alert
    }

    /// Sample the button. Returns the new lock state when it toggled.
    pub fn on_button(&mut self, level_high: bool, now_ms: u32) -> Option<bool> {
        if !self.debouncer.update(level_high, now_ms) {
            return None;
        }

        self.locked = !self.locked;
        info!("Lock {}", if self.locked { "engaged" } else { "released" });
        Some(self.locked)
    }

    /// Apply a motion tick. Returns `true` when this tick raised the alert.
    pub fn on_motion(&mut self, motion: bool) -> bool {
        if self.locked && motion && !self.alert {
            self.alert = true;
            info!("Alert raised: motion while locked");
            true
        } else {
            false
        }
    }

    /// Reset the alert latch. Returns `true` if an alert was cleared.
    pub fn clear_alert(&mut self) -> bool {
        let was_set = self.alert;
        self.alert = false;
        if was_set {
            info!("Alert cleared");
        }
        was_set
    }
}
