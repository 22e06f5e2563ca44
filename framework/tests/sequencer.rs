mod common;

use common::{init_logging, ManualClock, MockModem};
use simcom_gps::at::{
    AT_PING, FIX_REQUEST, GPS_COLD_RESET, GPS_POWER_ON, GPS_STANDALONE_MODE, STATUS_QUERY,
};
use trackbox::{Clock, CommandSequencer, SequencerConfig, TrackerConfig, TrackerContext};

const FIX_LINE: &str =
    "+CGPSINF: 0,2336.925300,4634.237600,760.600000,20250610122555.000,0,12,1.055640,24.139999";

fn setup(start_ms: u32) -> (ManualClock, MockModem, CommandSequencer, TrackerContext) {
    init_logging();
    let clock = ManualClock::starting_at(start_ms);
    let modem = MockModem::new(clock.clone());
    let sequencer = CommandSequencer::new(SequencerConfig::default(), start_ms);
    let ctx = TrackerContext::new(TrackerConfig::default(), start_ms);
    (clock, modem, sequencer, ctx)
}

#[test]
fn test_bring_up_sends_sequence_in_order() {
    let (clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.reply(AT_PING, &["AT", "OK"]);
    modem.reply(GPS_POWER_ON, &["OK"]);

    let report = sequencer.bring_up(&mut modem, &clock, &mut ctx);

    assert_eq!(
        modem.sent,
        vec![AT_PING, GPS_POWER_ON, GPS_STANDALONE_MODE, GPS_COLD_RESET]
    );
    assert_eq!(report.lines, 3);
    assert_eq!(report.send_failures, 0);
    assert_eq!(report.rejected, 0);
    // settle windows: 1500 + 2500 + 1500 + 3500
    assert_eq!(clock.now_ms(), 9000);
}

#[test]
fn test_bring_up_dispatches_responses() {
    let (clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.reply(GPS_COLD_RESET, &["OK", "$GPGSV,2,1,07,03,03,111,00*74"]);

    sequencer.bring_up(&mut modem, &clock, &mut ctx);

    assert_eq!(ctx.gps().satellites(), 7);
    assert!(!ctx.gps().has_fix());
}

#[test]
fn test_bring_up_counts_rejected_steps() {
    let (clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.reply(AT_PING, &["OK"]);
    modem.reply(GPS_POWER_ON, &["ERROR"]);
    modem.reply(GPS_STANDALONE_MODE, &["+CME ERROR: 4"]);
    modem.reply(GPS_COLD_RESET, &["OK"]);

    let report = sequencer.bring_up(&mut modem, &clock, &mut ctx);

    assert_eq!(report.rejected, 2);
    assert_eq!(report.send_failures, 0);
    assert_eq!(report.lines, 4);
    // a rejected step still runs to the end of its window
    assert_eq!(modem.sent.len(), 4);
    assert_eq!(clock.now_ms(), 9000);
}

#[test]
fn test_bring_up_survives_send_failures() {
    let (clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.fail_sends = true;

    let report = sequencer.bring_up(&mut modem, &clock, &mut ctx);

    assert_eq!(report.send_failures, 4);
    assert_eq!(modem.sent.len(), 4);
    assert_eq!(clock.now_ms(), 9000);
}

#[test]
fn test_fix_request_period_after_bring_up() {
    let (clock, mut modem, mut sequencer, mut ctx) = setup(0);
    sequencer.bring_up(&mut modem, &clock, &mut ctx);
    let t0 = clock.now_ms();

    assert!(!sequencer.poll(&mut modem, &mut ctx, t0 + 2999).fix_requested);
    assert!(sequencer.poll(&mut modem, &mut ctx, t0 + 3000).fix_requested);
    assert!(!sequencer.poll(&mut modem, &mut ctx, t0 + 3001).fix_requested);
    assert!(sequencer.poll(&mut modem, &mut ctx, t0 + 6000).fix_requested);

    assert_eq!(modem.sent_count(FIX_REQUEST), 2);
    assert_eq!(modem.sent_count(STATUS_QUERY), 0);
}

#[test]
fn test_status_query_independent_of_fix_timer() {
    let (_clock, mut modem, mut sequencer, mut ctx) = setup(0);

    let mut status = 0;
    for t in (0..=30_000).step_by(500) {
        if sequencer.poll(&mut modem, &mut ctx, t).status_requested {
            status += 1;
        }
    }

    assert_eq!(status, 2);
    assert_eq!(modem.sent_count(STATUS_QUERY), 2);
    assert_eq!(modem.sent_count(FIX_REQUEST), 10);
}

#[test]
fn test_fix_reply_updates_state_on_next_poll() {
    let (_clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.reply(FIX_REQUEST, &[FIX_LINE, "OK"]);

    sequencer.poll(&mut modem, &mut ctx, 3000);
    assert!(!ctx.gps().has_fix());

    let report = sequencer.poll(&mut modem, &mut ctx, 3010);
    assert_eq!(report.lines, 2);
    assert!(ctx.gps().has_fix());
    assert_eq!(ctx.gps().satellites(), 12);
}

#[test]
fn test_poll_bounds_lines_per_call() {
    let (_clock, mut modem, mut sequencer, mut ctx) = setup(0);
    for _ in 0..20 {
        modem.push_line("OK");
    }

    assert_eq!(sequencer.poll(&mut modem, &mut ctx, 1).lines, 8);
    assert_eq!(modem.pending(), 12);
    assert_eq!(sequencer.poll(&mut modem, &mut ctx, 2).lines, 8);
    assert_eq!(sequencer.poll(&mut modem, &mut ctx, 3).lines, 4);
}

#[test]
fn test_timers_across_clock_wrap() {
    let start = u32::MAX - 1000;
    let (_clock, mut modem, mut sequencer, mut ctx) = setup(start);

    assert!(!sequencer.poll(&mut modem, &mut ctx, u32::MAX).fix_requested);
    assert!(!sequencer.poll(&mut modem, &mut ctx, 1998).fix_requested);
    assert!(sequencer.poll(&mut modem, &mut ctx, 1999).fix_requested);
}

#[test]
fn test_incomplete_reply_leaves_fix_untouched() {
    let (_clock, mut modem, mut sequencer, mut ctx) = setup(0);
    modem.push_line(FIX_LINE);
    sequencer.poll(&mut modem, &mut ctx, 0);
    let before = *ctx.gps();

    modem.push_line("+CGPSINF: 0,2336.9,4634.2");
    modem.push_line("+CGPSINF: 0,0.000000,0.000000,0.000000,,0,3");
    sequencer.poll(&mut modem, &mut ctx, 10);

    assert_eq!(ctx.gps().last_fix().latitude, before.last_fix().latitude);
    assert_eq!(ctx.gps().last_fix().longitude, before.last_fix().longitude);
    assert_eq!(ctx.gps().last_fix().altitude, before.last_fix().altitude);
    assert_eq!(ctx.gps().satellites(), 3);
}
