//! Simulates a parked, locked vehicle being moved to exercise the tracker end to end
//!
//! A scripted modem answers the bring-up and fix requests (first with "no fix",
//! later with a real position), the accelerometer reports a resting vehicle
//! with sensor noise and then a tow-away jolt, and the MQTT side finally sends
//! `{"alert": false}`.
//!
//! Run with: cargo run -p trackbox-framework --example theft_sim

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use simcom_gps::at::FIX_REQUEST;
use trackbox::{
    AccelSample, Accelerometer, Clock, CommandSequencer, ControlCommand, LineTransport,
    SensorError, SequencerConfig, TrackerConfig, TrackerContext,
};

const NO_FIX: &str = "+CGPSINF: 0,0.000000,0.000000,0.000000,,0,0";
const FIX: &str =
    "+CGPSINF: 0,2336.925300,4634.237600,760.600000,20250610122555.000,0,12,1.055640,24.139999";

/// Simple pseudo-random noise generator (deterministic for reproducibility)
struct NoiseGen {
    state: u32,
}

impl NoiseGen {
    fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Returns noise in range [-amplitude, +amplitude]
    fn next(&mut self, amplitude: f32) -> f32 {
        self.state = self.state.wrapping_mul(1103515245).wrapping_add(12345);
        let normalized = (self.state as f32 / u32::MAX as f32) * 2.0 - 1.0;
        normalized * amplitude
    }
}

/// Accelerometer backed by a sample generator
struct ScriptedAccel<'a, F>(&'a mut F);

impl<F: FnMut() -> AccelSample> Accelerometer for ScriptedAccel<'_, F> {
    fn read(&mut self) -> Result<AccelSample, SensorError> {
        Ok((self.0)())
    }
}

#[derive(Clone)]
struct SimClock(Rc<Cell<u32>>);

impl Clock for SimClock {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}

/// Modem that answers fix requests with "no fix" until `fix_after` requests
struct SimModem {
    clock: SimClock,
    inbox: VecDeque<String>,
    current: String,
    fix_requests: u32,
    fix_after: u32,
}

impl LineTransport for SimModem {
    type Error = ();

    fn send_line(&mut self, command: &str) -> Result<(), ()> {
        if command == FIX_REQUEST {
            self.fix_requests += 1;
            let reply = if self.fix_requests > self.fix_after {
                FIX
            } else {
                NO_FIX
            };
            self.inbox.push_back(reply.to_string());
        }
        self.inbox.push_back("OK".to_string());
        Ok(())
    }

    fn read_line(&mut self, timeout_ms: u32) -> Option<&str> {
        match self.inbox.pop_front() {
            Some(line) => {
                self.current = line;
                Some(&self.current)
            }
            None => {
                let clock = &self.clock.0;
                clock.set(clock.get().wrapping_add(timeout_ms));
                None
            }
        }
    }
}

fn main() {
    let clock = SimClock(Rc::new(Cell::new(0)));
    let mut modem = SimModem {
        clock: clock.clone(),
        inbox: VecDeque::new(),
        current: String::new(),
        fix_requests: 0,
        fix_after: 3,
    };
    let mut noise = NoiseGen::new(7);

    let mut ctx = TrackerContext::new(TrackerConfig::default(), 0);
    let mut sequencer = CommandSequencer::new(SequencerConfig::default(), 0);

    println!("=== Trackbox Theft Simulation ===\n");

    println!("Phase 1: MODEM BRING-UP");
    let report = sequencer.bring_up(&mut modem, &clock, &mut ctx);
    println!(
        "  {} lines in {:.1}s, {} send failures, {} rejected\n",
        report.lines,
        clock.now_ms() as f32 / 1000.0,
        report.send_failures,
        report.rejected
    );

    println!("Phase 2: PARKED, LOCKING (30s)");
    ctx.on_button(true, clock.now_ms());
    ctx.on_button(false, clock.now_ms());
    println!("  locked={}", ctx.lock().locked());

    let mut motion_ticks = 0;
    for _ in 0..300 {
        step(&clock, &mut modem, &mut sequencer, &mut ctx, || {
            AccelSample::new(noise.next(0.03), noise.next(0.03), 1.0 + noise.next(0.03))
        });
        if ctx.motion() {
            motion_ticks += 1;
        }
    }
    let fix = ctx.gps().last_fix();
    println!(
        "  GPS valid={}, {:.6}, {:.6}, {} satellites",
        ctx.gps().has_fix(),
        fix.latitude,
        fix.longitude,
        fix.satellites
    );
    if motion_ticks > 0 || ctx.lock().alert() {
        println!("  ⚠️  WARNING: sensor noise triggered motion");
    } else {
        println!("  ✓ PASS: no motion while resting");
    }
    println!();

    println!("Phase 3: TOW-AWAY (6s of jolts)");
    let mut jolt = 0u32;
    for _ in 0..60 {
        step(&clock, &mut modem, &mut sequencer, &mut ctx, || {
            jolt += 1;
            let swing = if jolt % 2 == 0 { 0.4 } else { -0.4 };
            AccelSample::new(swing, noise.next(0.1), 1.0 + noise.next(0.1))
        });
    }
    println!("  alert={}", ctx.lock().alert());
    match ctx.telemetry("sim-01", clock.now_ms()).to_json() {
        Ok(json) => println!("  telemetry: {}", json),
        Err(e) => println!("  telemetry encode failed: {}", e),
    }
    println!();

    println!("Phase 4: OPERATOR CLEARS ALERT");
    let cleared = match ControlCommand::from_json(br#"{"alert": false}"#) {
        Ok(command) => ctx.apply_control(&command),
        Err(e) => {
            println!("  control decode failed: {}", e);
            false
        }
    };
    println!("  cleared={}, alert={}", cleared, ctx.lock().alert());
    if cleared && !ctx.lock().alert() {
        println!("  ✓ PASS: alert latched until cleared");
    }
}

/// Advance 100 ms and run one loop iteration
fn step<F>(
    clock: &SimClock,
    modem: &mut SimModem,
    sequencer: &mut CommandSequencer,
    ctx: &mut TrackerContext,
    mut sample: F,
) where
    F: FnMut() -> AccelSample,
{
    clock.0.set(clock.0.get().wrapping_add(100));
    let now = clock.now_ms();

    sequencer.poll(modem, ctx, now);
    if let Err(e) = ctx.poll_motion(&mut ScriptedAccel(&mut sample), now) {
        println!("  accelerometer error: {}", e);
    }
}
