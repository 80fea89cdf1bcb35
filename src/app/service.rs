//! Stack controller — the hexagonal core.
//!
//! [`StackController`] owns every piece of mutable controller state: the
//! scheduler counters, the current filter, the last reading, the
//! permission flags and the indicator phase.  It exposes a
//! hardware-agnostic API; the platform is borrowed on each driving call.
//!
//! ```text
//!  AnalogPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  ClockPort  ──▶ │        StackController       │
//! DigitalPort ◀── │ Scheduler · Sampler · Pulses │
//!     DelayNs ◀── └──────────────────────────────┘
//! ```
//!
//! Lifecycle: [`new`](StackController::new) resolves the hardware profile
//! (configuration errors surface here), [`start`](StackController::start)
//! initialises outputs and blocks on the start-up gate, then the host calls
//! [`poll`](StackController::poll) at least every 100 ms.
//!
//! Single-threaded by construction: every mutating call takes `&mut self`.

use log::{info, warn};

use crate::config::{ControllerConfig, TimingProfile};
use crate::drivers::sequencer::Sequencer;
use crate::drivers::status_led::StatusIndicator;
use crate::drivers::drive;
use crate::error::{ConfigError, Error, Result};
use crate::profile::{HardwareProfile, Logical};
use crate::scheduler::{DueActions, PollScheduler, ScheduledAction};
use crate::sensors::ElectricalSampler;

use super::commands::ControllerCommand;
use super::events::{Action, ControllerEvent};
use super::ports::{EventSink, Platform};
use super::startup;

/// Duty cycle of the v1.0 charge-pump square wave.
const CHARGE_PUMP_DUTY_PERCENT: u8 = 50;

// ───────────────────────────────────────────────────────────────
// StackController
// ───────────────────────────────────────────────────────────────

pub struct StackController {
    profile: HardwareProfile,
    timings: TimingProfile,
    sampler: ElectricalSampler,
    sequencer: Sequencer,
    indicator: StatusIndicator,
    /// `None` until `start()` has passed the gate.
    scheduler: Option<PollScheduler>,
}

impl StackController {
    /// Resolve the hardware profile for `config`.
    ///
    /// Does **not** touch hardware; call [`start`](Self::start) next.
    pub fn new(config: ControllerConfig) -> core::result::Result<Self, ConfigError> {
        let profile = HardwareProfile::resolve(&config)?;
        Ok(Self {
            timings: TimingProfile::for_class(profile.stack_class),
            sampler: ElectricalSampler::new(&profile),
            sequencer: Sequencer::new(),
            indicator: StatusIndicator::new(),
            scheduler: None,
            profile,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// One-time initialisation.  Blocks until the reservoir is charged.
    ///
    /// Re-installs the class default timings and re-enables both actions,
    /// discarding anything set before this call.
    pub fn start(&mut self, hw: &mut impl Platform, sink: &mut impl EventSink) -> Result<()> {
        let p = self.profile;

        self.scheduler = None;
        self.sequencer = Sequencer::new();
        self.timings = TimingProfile::for_class(p.stack_class);
        self.sampler = ElectricalSampler::new(&p);

        // ── Outputs ──────────────────────────────────────────
        hw.set_reference(p.reference)?;
        hw.configure_output(p.pins.status_led)?;
        if p.has_load_switch() {
            hw.configure_output(p.pins.load)?;
            // connected, so the stack can charge the reservoir
            drive(hw, &p, p.pins.load, Logical::Active)?;
        }
        if let (true, Some(osc)) = (p.needs_charge_pump(), p.pins.oscillator) {
            hw.start_square_wave(osc, CHARGE_PUMP_DUTY_PERCENT)?;
        }
        hw.configure_output(p.pins.short_circuit)?;
        drive(hw, &p, p.pins.short_circuit, Logical::Inactive)?;
        hw.configure_output(p.pins.purge)?;
        drive(hw, &p, p.pins.purge, Logical::Inactive)?;

        // ── Announce ─────────────────────────────────────────
        sink.emit(&ControllerEvent::Identity {
            stack_class: p.stack_class,
            board_revision: p.board_revision,
        });
        sink.emit(&ControllerEvent::Timings(self.timings));
        startup::announce(hw, &p, &mut self.indicator)?;

        // ── Gate ─────────────────────────────────────────────
        startup::wait_for_charge(hw, &p, &mut self.sampler, &mut self.indicator, sink)?;

        self.scheduler = Some(PollScheduler::new(&self.timings, hw.now_millis()));
        info!(
            "controller started: {} stack on {} board",
            p.stack_class, p.board_revision
        );
        Ok(())
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Advance the four timers and run whatever fell due.
    ///
    /// Returns the actions that fired, in evaluation order.  A purge or
    /// short-circuit blocks for its pulse before this returns.
    pub fn poll(&mut self, hw: &mut impl Platform, sink: &mut impl EventSink) -> Result<DueActions> {
        let now = hw.now_millis();
        let scheduler = self.scheduler.as_mut().ok_or(Error::NotStarted)?;
        let due = scheduler.tick(now);

        for action in &due {
            match action {
                ScheduledAction::Status => {
                    self.indicator.toggle(hw, &self.profile)?;
                    self.status(sink);
                }
                ScheduledAction::Sample => {
                    self.sampler.sample(hw)?;
                }
                ScheduledAction::ShortCircuit => {
                    let cap_mv = self.sampler.last().cap_mv;
                    self.sequencer.short_circuit(
                        hw,
                        &self.profile,
                        self.timings.short_circuit_pulse_ms,
                        cap_mv,
                        sink,
                    )?;
                }
                ScheduledAction::Purge => {
                    self.sequencer
                        .purge(hw, &self.profile, self.timings.purge_pulse_ms, sink)?;
                }
            }
        }
        Ok(due)
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a host command.
    pub fn handle_command(&mut self, cmd: ControllerCommand, sink: &mut impl EventSink) {
        match cmd {
            ControllerCommand::EnablePurge => self.enable_purge(sink),
            ControllerCommand::DisablePurge => self.disable_purge(sink),
            ControllerCommand::EnableShort => self.enable_short(sink),
            ControllerCommand::DisableShort => self.disable_short(sink),
            ControllerCommand::OverrideTimings(t) => self.override_timings(t, sink),
            ControllerCommand::Status => self.status(sink),
        }
    }

    pub fn enable_purge(&mut self, sink: &mut impl EventSink) {
        self.sequencer.set_purge_enabled(true);
        emit_permission(sink, Action::Purge, true);
    }

    pub fn disable_purge(&mut self, sink: &mut impl EventSink) {
        self.sequencer.set_purge_enabled(false);
        emit_permission(sink, Action::Purge, false);
    }

    pub fn enable_short(&mut self, sink: &mut impl EventSink) {
        self.sequencer.set_short_enabled(true);
        emit_permission(sink, Action::ShortCircuit, true);
    }

    pub fn disable_short(&mut self, sink: &mut impl EventSink) {
        self.sequencer.set_short_enabled(false);
        emit_permission(sink, Action::ShortCircuit, false);
    }

    /// Replace the timing profile wholesale.  Not validated: a profile that
    /// breaks the pulse/interval ordering is applied anyway, with a warning.
    pub fn override_timings(&mut self, timings: TimingProfile, sink: &mut impl EventSink) {
        if let Err(why) = timings.check() {
            warn!("timing override applied despite: {}", why);
        }
        self.timings = timings;
        if let Some(scheduler) = self.scheduler.as_mut() {
            scheduler.set_timings(&timings);
        }
        sink.emit(&ControllerEvent::TimingsOverridden);
        sink.emit(&ControllerEvent::Timings(timings));
    }

    /// Report the last-sampled voltage / current pair.
    pub fn status(&self, sink: &mut impl EventSink) {
        let r = self.sampler.last();
        sink.emit(&ControllerEvent::Status {
            volts: r.stack_volts,
            amps: r.stack_amps,
        });
    }

    // ── Queries ───────────────────────────────────────────────

    /// Stack voltage (V) from the last electrical sample.
    pub fn voltage(&self) -> f32 {
        self.sampler.last().stack_volts
    }

    /// Filtered stack current (A) from the last electrical sample.
    pub fn current(&self) -> f32 {
        self.sampler.last().stack_amps
    }

    /// Reservoir voltage (mV) from the last electrical sample.
    pub fn capacitor_mv(&self) -> f32 {
        self.sampler.last().cap_mv
    }

    pub fn timings(&self) -> TimingProfile {
        self.timings
    }

    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    pub fn purge_enabled(&self) -> bool {
        self.sequencer.purge_enabled()
    }

    pub fn short_enabled(&self) -> bool {
        self.sequencer.short_enabled()
    }

    pub fn is_started(&self) -> bool {
        self.scheduler.is_some()
    }
}

fn emit_permission(sink: &mut impl EventSink, action: Action, enabled: bool) {
    info!("{:?} {}", action, if enabled { "enabled" } else { "disabled" });
    sink.emit(&ControllerEvent::PermissionChanged { action, enabled });
}
