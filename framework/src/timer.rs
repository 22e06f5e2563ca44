//! Millisecond clock and rollover-safe periodic timers
//!
//! Time is a `u32` millisecond counter that wraps after ~49.7 days. All
//! comparisons go through [`elapsed_ms`] so a wrap never stalls or
//! double-fires a timer.

/// Monotonic millisecond time source
pub trait Clock {
    fn now_ms(&self) -> u32;
}

/// Milliseconds from `since` to `now`, correct across one wrap
#[inline]
pub fn elapsed_ms(now_ms: u32, since_ms: u32) -> u32 {
    now_ms.wrapping_sub(since_ms)
}

/// Fixed-period timer
///
/// Fires once `period_ms` has elapsed since it last fired (or since it was
/// created). Late polls do not accumulate: the next period counts from the
/// poll that fired.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u32,
    last_ms: u32,
}

impl Interval {
    pub fn new(period_ms: u32, now_ms: u32) -> Self {
        Self {
            period_ms,
            last_ms: now_ms,
        }
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn is_due(&self, now_ms: u32) -> bool {
        elapsed_ms(now_ms, self.last_ms) >= self.period_ms
    }

    /// Returns `true` and restarts the period if the timer is due
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.is_due(now_ms) {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }

    /// Restart the period from `now_ms` without firing
    pub fn reset(&mut self, now_ms: u32) {
        self.last_ms = now_ms;
    }
}
