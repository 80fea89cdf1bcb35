//! Integration tests for the StackController → sequencer → pins pipeline.
//!
//! These run on the host against [`MockPlatform`] with a fake clock, so
//! a minute of controller time takes a few milliseconds.

use embedded_hal::digital::PinState::{High, Low};

use fuelcell::app::events::{ControllerEvent, SkipReason};
use fuelcell::app::ports::ClockPort;
use fuelcell::app::service::StackController;
use fuelcell::config::{BoardRevision, ControllerConfig, StackClass, TimingProfile};
use fuelcell::error::{ConfigError, Error, HwError};
use fuelcell::pins::{AnalogChannel, Pin};
use fuelcell::profile::AnalogReference;
use fuelcell::scheduler::ScheduledAction;

use crate::mock_hw::{MockPlatform, RecordingSink};

/// Capacitor samples that just clear the 3500 mV gate.
const V1_3_CHARGED_RAW: u16 = 544;
const V1_0_CHARGED_RAW: u16 = 717;

fn started(
    class: StackClass,
    rev: BoardRevision,
    cap_raw: u16,
) -> (StackController, MockPlatform, RecordingSink) {
    let mut c = StackController::new(ControllerConfig::new(class, rev)).unwrap();
    let mut hw = MockPlatform::new(cap_raw);
    let mut sink = RecordingSink::new();
    c.start(&mut hw, &mut sink).unwrap();
    (c, hw, sink)
}

/// Poll every 100 ms until the clock would pass `until_ms`.
fn run_until(
    c: &mut StackController,
    hw: &mut MockPlatform,
    sink: &mut RecordingSink,
    until_ms: u64,
) -> Vec<ScheduledAction> {
    let mut fired = Vec::new();
    while hw.now_millis() + 100 <= until_ms {
        hw.advance(100);
        fired.extend(c.poll(hw, sink).unwrap());
    }
    fired
}

fn count(fired: &[ScheduledAction], action: ScheduledAction) -> usize {
    fired.iter().filter(|a| **a == action).count()
}

// ── End to end ────────────────────────────────────────────────

#[test]
fn twelve_watt_first_ten_seconds() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);

    // 3 announce blinks + one gate iteration
    let t0 = hw.now_millis();
    assert_eq!(t0, 500);
    let mark = hw.writes.len();

    hw.advance(401);
    let due = c.poll(&mut hw, &mut sink).unwrap();
    assert_eq!(due.as_slice(), &[ScheduledAction::Sample]);
    assert!((c.capacitor_mv() - 3506.25).abs() < 0.01);
    assert!((c.voltage() - 7.1045).abs() < 0.001);
    assert!(c.current().abs() < 0.01);

    let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 10_001);
    assert_eq!(count(&fired, ScheduledAction::ShortCircuit), 1);
    assert_eq!(count(&fired, ScheduledAction::Purge), 0);
    assert!(count(&fired, ScheduledAction::Status) >= 15);

    let pins = c.profile().pins;
    assert_eq!(hw.writes_to(pins.short_circuit, mark), vec![High, Low]);
    assert!(hw.writes_to(pins.purge, mark).is_empty());
    // no load switch on the large stacks
    assert!(hw.writes_to(pins.load, 0).is_empty());
    assert!(!hw.outputs.contains(&pins.load));

    assert_eq!(sink.count(|e| *e == ControllerEvent::ShortCircuit), 1);
}

#[test]
fn startup_configures_outputs_at_their_inactive_level() {
    let (c, hw, sink) = started(StackClass::W30, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    let pins = c.profile().pins;

    assert_eq!(hw.reference, Some(AnalogReference::External));
    assert_eq!(hw.level(pins.short_circuit), Some(Low));
    assert_eq!(hw.level(pins.purge), Some(Low));
    assert!(c.is_started());

    assert_eq!(
        sink.events[0],
        ControllerEvent::Identity {
            stack_class: StackClass::W30,
            board_revision: BoardRevision::V1_3,
        }
    );
    assert_eq!(
        sink.events[1],
        ControllerEvent::Timings(TimingProfile::for_class(StackClass::W30))
    );
    assert_eq!(sink.events.last(), Some(&ControllerEvent::Charged));
}

// ── Start-up gate ─────────────────────────────────────────────

#[test]
fn gate_blocks_until_reservoir_charged() {
    let mut c =
        StackController::new(ControllerConfig::new(StackClass::W12, BoardRevision::V1_3)).unwrap();
    let mut hw = MockPlatform::new(V1_3_CHARGED_RAW);
    hw.script(AnalogChannel::CapacitorVoltage, &[0, 200, 400]);
    let mut sink = RecordingSink::new();

    c.start(&mut hw, &mut sink).unwrap();

    let progress: Vec<f32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            ControllerEvent::ChargeProgress { cap_mv } => Some(*cap_mv),
            _ => None,
        })
        .collect();
    assert_eq!(progress.len(), 4);
    assert_eq!(progress[0], 0.0);
    assert!(progress[3] >= 3500.0);
    assert_eq!(sink.events.last(), Some(&ControllerEvent::Charged));

    // 300 ms of announce, then 200 ms per gate iteration
    assert_eq!(hw.now_millis(), 300 + 4 * 200);
    // one LED toggle per announce blink and per gate iteration
    assert_eq!(hw.writes_to(c.profile().pins.status_led, 0).len(), 3 + 4);
}

#[test]
fn poll_before_start_is_refused() {
    let mut c =
        StackController::new(ControllerConfig::new(StackClass::W3, BoardRevision::V1_3)).unwrap();
    let mut hw = MockPlatform::new(V1_3_CHARGED_RAW);
    let mut sink = RecordingSink::new();

    assert_eq!(c.poll(&mut hw, &mut sink), Err(Error::NotStarted));
    assert!(hw.writes.is_empty());
}

#[test]
fn start_discards_earlier_overrides_and_permissions() {
    let mut c =
        StackController::new(ControllerConfig::new(StackClass::W30, BoardRevision::V1_3)).unwrap();
    let mut hw = MockPlatform::new(V1_3_CHARGED_RAW);
    let mut sink = RecordingSink::new();

    c.override_timings(TimingProfile::new(2000, 50, 4000, 50), &mut sink);
    c.disable_purge(&mut sink);
    c.start(&mut hw, &mut sink).unwrap();

    assert_eq!(c.timings(), TimingProfile::for_class(StackClass::W30));
    assert!(c.purge_enabled());
}

// ── Polarity ──────────────────────────────────────────────────

#[test]
fn purge_pulse_polarity_follows_the_board() {
    for (rev, cap_raw, expected) in [
        (BoardRevision::V1_0, V1_0_CHARGED_RAW, vec![High, Low, High]),
        (BoardRevision::V1_3, V1_3_CHARGED_RAW, vec![Low, High, Low]),
    ] {
        let (mut c, mut hw, mut sink) = started(StackClass::W30, rev, cap_raw);
        let t0 = hw.now_millis();
        let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 10_500);

        assert_eq!(count(&fired, ScheduledAction::Purge), 1, "{rev}");
        // initial inactive level, then the pulse
        assert_eq!(hw.writes_to(c.profile().pins.purge, 0), expected, "{rev}");
    }
}

#[test]
fn charge_pump_only_on_large_stacks_on_v1_0() {
    let (c, hw, _) = started(StackClass::W12, BoardRevision::V1_0, V1_0_CHARGED_RAW);
    assert_eq!(hw.reference, Some(AnalogReference::Internal));
    assert_eq!(hw.square_waves, vec![(Pin(3), 50)]);
    assert_eq!(hw.level(c.profile().pins.short_circuit), Some(High));

    let (_, hw, _) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    assert!(hw.square_waves.is_empty());

    // pin 3 drives the load switch on small stacks instead
    let (c, hw, _) = started(StackClass::W3, BoardRevision::V1_0, V1_0_CHARGED_RAW);
    assert!(hw.square_waves.is_empty());
    assert_eq!(c.profile().pins.load, Pin(3));
    assert_eq!(hw.level(Pin(3)), Some(High));
}

// ── Actuation sequencing ──────────────────────────────────────

#[test]
fn small_stack_pulse_is_bracketed_by_load_disconnect() {
    let (mut c, mut hw, mut sink) = started(StackClass::W3, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    let pins = c.profile().pins;
    assert_eq!(hw.writes_to(pins.load, 0), vec![High]);

    let t0 = hw.now_millis();
    let mark = hw.writes.len();
    let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 5_500);
    assert_eq!(count(&fired, ScheduledAction::ShortCircuit), 1);

    assert_eq!(
        hw.writes_among(&[pins.load, pins.short_circuit], mark),
        vec![
            (pins.load, Low),
            (pins.short_circuit, High),
            (pins.short_circuit, Low),
            (pins.load, High),
        ]
    );
}

#[test]
fn small_stack_purge_is_bracketed_by_load_disconnect() {
    let (mut c, mut hw, mut sink) =
        started(StackClass::W1_5, BoardRevision::V1_2, V1_3_CHARGED_RAW);
    c.disable_short(&mut sink);
    let pins = c.profile().pins;

    let t0 = hw.now_millis();
    let mark = hw.writes.len();
    let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 60_200);
    assert_eq!(count(&fired, ScheduledAction::Purge), 1);

    assert_eq!(
        hw.writes_among(&[pins.load, pins.purge], mark),
        vec![
            (pins.load, Low),
            (pins.purge, High),
            (pins.purge, Low),
            (pins.load, High),
        ]
    );
    assert_eq!(sink.count(|e| *e == ControllerEvent::Purge), 1);
}

#[test]
fn disabled_actions_never_touch_their_pins() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    c.disable_purge(&mut sink);
    c.disable_short(&mut sink);
    sink.clear();

    let t0 = hw.now_millis();
    let mark = hw.writes.len();
    let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 60_000);

    let pins = c.profile().pins;
    assert!(hw.writes_to(pins.short_circuit, mark).is_empty());
    assert!(hw.writes_to(pins.purge, mark).is_empty());

    let shorts = count(&fired, ScheduledAction::ShortCircuit);
    let purges = count(&fired, ScheduledAction::Purge);
    assert!(shorts >= 5);
    assert_eq!(purges, 2);
    assert_eq!(
        sink.count(|e| *e == ControllerEvent::ShortCircuitSkipped(SkipReason::Disabled)),
        shorts
    );
    assert_eq!(
        sink.count(|e| *e == ControllerEvent::PurgeSkipped(SkipReason::Disabled)),
        purges
    );
}

#[test]
fn re_enabled_short_fires_on_its_next_due_tick() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    c.disable_short(&mut sink);

    let t0 = hw.now_millis();
    let mark = hw.writes.len();
    run_until(&mut c, &mut hw, &mut sink, t0 + 6_000);
    assert!(hw.writes_to(c.profile().pins.short_circuit, mark).is_empty());

    c.enable_short(&mut sink);
    run_until(&mut c, &mut hw, &mut sink, t0 + 16_000);
    assert_eq!(hw.writes_to(c.profile().pins.short_circuit, mark), vec![High, Low]);
}

#[test]
fn low_reservoir_skips_short_circuit() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    // 400 counts = 2578.125 mV at the capacitor
    hw.set_analog(AnalogChannel::CapacitorVoltage, 400);

    let t0 = hw.now_millis();
    let mark = hw.writes.len();
    let fired = run_until(&mut c, &mut hw, &mut sink, t0 + 6_000);

    assert_eq!(count(&fired, ScheduledAction::ShortCircuit), 1);
    assert!(hw.writes_to(c.profile().pins.short_circuit, mark).is_empty());
    assert_eq!(sink.count(|e| *e == ControllerEvent::ShortCircuit), 0);

    let skipped = sink.events.iter().find_map(|e| match e {
        ControllerEvent::ShortCircuitSkipped(SkipReason::ReservoirLow { cap_mv }) => Some(*cap_mv),
        _ => None,
    });
    let cap_mv = skipped.expect("short-circuit should have been skipped");
    assert!((cap_mv - 2578.125).abs() < 0.01);
}

// ── Scheduling ────────────────────────────────────────────────

#[test]
fn counters_fire_strictly_after_their_interval() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);

    hw.advance(400);
    assert!(c.poll(&mut hw, &mut sink).unwrap().is_empty());
    hw.advance(1);
    assert_eq!(
        c.poll(&mut hw, &mut sink).unwrap().as_slice(),
        &[ScheduledAction::Sample]
    );
    hw.advance(99);
    assert!(c.poll(&mut hw, &mut sink).unwrap().is_empty());
    hw.advance(1);
    assert_eq!(
        c.poll(&mut hw, &mut sink).unwrap().as_slice(),
        &[ScheduledAction::Status]
    );
    assert!(matches!(
        sink.events.last(),
        Some(ControllerEvent::Status { .. })
    ));
}

#[test]
fn override_keeps_accumulated_phase() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    let t0 = hw.now_millis();

    // the short counter already holds its 5000 ms offset
    c.override_timings(TimingProfile::new(2000, 50, 4000, 50), &mut sink);
    hw.advance(1);
    let due = c.poll(&mut hw, &mut sink).unwrap();
    assert_eq!(due.as_slice(), &[ScheduledAction::ShortCircuit]);

    // the pulse blocked for its new length
    assert_eq!(hw.now_millis(), t0 + 1 + 50);
}

// ── Errors ────────────────────────────────────────────────────

#[test]
fn out_of_range_sample_aborts_start() {
    let mut c =
        StackController::new(ControllerConfig::new(StackClass::W12, BoardRevision::V1_3)).unwrap();
    let mut hw = MockPlatform::new(V1_3_CHARGED_RAW);
    hw.set_analog(AnalogChannel::StackVoltage, 1024);
    let mut sink = RecordingSink::new();

    assert_eq!(
        c.start(&mut hw, &mut sink),
        Err(Error::Hardware(HwError::AnalogOutOfRange {
            channel: AnalogChannel::StackVoltage,
            raw: 1024,
        }))
    );
    assert!(!c.is_started());
}

#[test]
fn adc_failure_propagates_from_poll() {
    let (mut c, mut hw, mut sink) = started(StackClass::W12, BoardRevision::V1_3, V1_3_CHARGED_RAW);
    hw.fail_channel = Some(AnalogChannel::StackCurrent);
    hw.advance(401);

    assert_eq!(
        c.poll(&mut hw, &mut sink),
        Err(Error::Hardware(HwError::AnalogRead(AnalogChannel::StackCurrent)))
    );
}

#[test]
fn large_stack_on_v1_2_is_rejected() {
    let err = StackController::new(ControllerConfig::new(StackClass::W30, BoardRevision::V1_2));
    assert!(matches!(err, Err(ConfigError::UnsupportedCombination(_))));
}
