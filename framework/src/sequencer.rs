//! Modem command scheduling
//!
//! Runs the one-time GPS bring-up, then keeps two independent timers: a
//! fix request and a slower status query. Responses are never awaited
//! synchronously after bring-up; they are drained on every poll and
//! dispatched through the tracker context.

use log::{info, warn};
use simcom_gps::at::{BringUpStep, ResultCode, BRING_UP_SEQUENCE, FIX_REQUEST, STATUS_QUERY};
use simcom_gps::LineTransport;

use crate::context::TrackerContext;
use crate::timer::{elapsed_ms, Clock, Interval};

/// Default fix request period (ms)
pub const DEFAULT_FIX_INTERVAL_MS: u32 = 3000;

/// Default status query period (ms)
pub const DEFAULT_STATUS_INTERVAL_MS: u32 = 15000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerConfig {
    pub fix_interval_ms: u32,
    pub status_interval_ms: u32,
    /// Upper bound on lines handled per poll so the loop never starves
    pub max_lines_per_poll: usize,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            fix_interval_ms: DEFAULT_FIX_INTERVAL_MS,
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            max_lines_per_poll: 8,
        }
    }
}

/// Summary of the bring-up sequence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BringUpReport {
    pub lines: usize,
    pub send_failures: usize,
    /// Steps the modem answered with `ERROR`
    pub rejected: usize,
}

/// What one poll did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PollReport {
    pub lines: usize,
    pub fix_requested: bool,
    pub status_requested: bool,
}

pub struct CommandSequencer {
    config: SequencerConfig,
    fix_timer: Interval,
    status_timer: Interval,
}

impl CommandSequencer {
    pub fn new(config: SequencerConfig, now_ms: u32) -> Self {
        Self {
            config,
            fix_timer: Interval::new(config.fix_interval_ms, now_ms),
            status_timer: Interval::new(config.status_interval_ms, now_ms),
        }
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    /// Send the bring-up commands in order, draining responses during each
    /// step's settle window. Send failures are logged and do not abort.
    pub fn bring_up<T, C>(
        &mut self,
        transport: &mut T,
        clock: &C,
        ctx: &mut TrackerContext,
    ) -> BringUpReport
    where
        T: LineTransport,
        C: Clock,
    {
        let mut report = BringUpReport::default();

        for step in BRING_UP_SEQUENCE.iter() {
            info!("Modem: {} ({})", step.name, step.command);
            if let Err(e) = transport.send_line(step.command) {
                warn!("Modem: failed to send {}: {:?}", step.command, e);
                report.send_failures += 1;
            }
            let (lines, result) = drain_window(transport, clock, ctx, step);
            report.lines += lines;
            match result {
                Some(ResultCode::Ok) => {}
                Some(ResultCode::Error) => {
                    warn!("Modem: {} rejected", step.command);
                    report.rejected += 1;
                }
                None => warn!("Modem: no result for {}", step.command),
            }
        }

        let now = clock.now_ms();
        self.fix_timer.reset(now);
        self.status_timer.reset(now);
        info!(
            "Modem: GPS bring-up complete ({} rejected)",
            report.rejected
        );

        report
    }

    /// Handle buffered lines and fire due timers
    pub fn poll<T: LineTransport>(
        &mut self,
        transport: &mut T,
        ctx: &mut TrackerContext,
        now_ms: u32,
    ) -> PollReport {
        let mut report = PollReport::default();

        while report.lines < self.config.max_lines_per_poll {
            match transport.read_line(0) {
                Some(line) => {
                    ctx.handle_modem_line(line);
                    report.lines += 1;
                }
                None => break,
            }
        }

        if self.fix_timer.poll(now_ms) {
            if let Err(e) = transport.send_line(FIX_REQUEST) {
                warn!("Modem: fix request failed: {:?}", e);
            }
            report.fix_requested = true;
        }

        if self.status_timer.poll(now_ms) {
            if let Err(e) = transport.send_line(STATUS_QUERY) {
                warn!("Modem: status query failed: {:?}", e);
            }
            info!("GPS satellites: {}", ctx.gps().satellites());
            report.status_requested = true;
        }

        report
    }
}

fn drain_window<T, C>(
    transport: &mut T,
    clock: &C,
    ctx: &mut TrackerContext,
    step: &BringUpStep,
) -> (usize, Option<ResultCode>)
where
    T: LineTransport,
    C: Clock,
{
    let start = clock.now_ms();
    let window = step.window_ms();
    let mut lines = 0;
    let mut result = None;

    loop {
        let spent = elapsed_ms(clock.now_ms(), start);
        if spent >= window {
            break;
        }
        if let Some(line) = transport.read_line(window - spent) {
            if let Some(code) = ResultCode::from_line(line) {
                result = Some(code);
            }
            ctx.handle_modem_line(line);
            lines += 1;
        }
    }

    (lines, result)
}
