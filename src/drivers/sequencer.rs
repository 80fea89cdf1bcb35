//! Actuation sequencer — purge and short-circuit pulses.
//!
//! Both sequences bracket the pulse with a load disconnect on stacks that
//! have a load switch:
//!
//! ```text
//! load ─┐               ┌─  (1.5W / 3W only)
//!       └───────────────┘
//! pin   ────┐     ┌──────
//!           └─────┘          held for the configured pulse (blocking)
//! ```
//!
//! ## Safety contract
//!
//! A short-circuit dumps the stack into the reservoir.  It never runs
//! while the last sampled capacitor voltage is below the profile's charge
//! threshold, whatever the permission flags say.  Skips are logged, not
//! errors, and nothing is retried.
//!
//! The pulse blocks the whole controller for its duration; no sampling or
//! status reporting happens meanwhile.

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::events::{ControllerEvent, SkipReason};
use crate::app::ports::{DigitalPort, EventSink};
use crate::error::HwError;
use crate::pins::Pin;
use crate::profile::{HardwareProfile, Logical};

use super::drive;

/// What a sequence call did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PulseOutcome {
    Fired,
    Skipped(SkipReason),
}

pub struct Sequencer {
    purge_enabled: bool,
    short_enabled: bool,
}

impl Sequencer {
    /// Both actions start enabled.
    pub fn new() -> Self {
        Self {
            purge_enabled: true,
            short_enabled: true,
        }
    }

    pub fn set_purge_enabled(&mut self, enabled: bool) {
        self.purge_enabled = enabled;
    }

    pub fn set_short_enabled(&mut self, enabled: bool) {
        self.short_enabled = enabled;
    }

    pub fn purge_enabled(&self) -> bool {
        self.purge_enabled
    }

    pub fn short_enabled(&self) -> bool {
        self.short_enabled
    }

    /// Vent waste gas: open the purge valve for `pulse_ms`.
    pub fn purge(
        &mut self,
        hw: &mut (impl DigitalPort + DelayNs),
        profile: &HardwareProfile,
        pulse_ms: u32,
        sink: &mut impl EventSink,
    ) -> Result<PulseOutcome, HwError> {
        if !self.purge_enabled {
            sink.emit(&ControllerEvent::PurgeSkipped(SkipReason::Disabled));
            return Ok(PulseOutcome::Skipped(SkipReason::Disabled));
        }
        sink.emit(&ControllerEvent::Purge);
        pulse(hw, profile, profile.pins.purge, pulse_ms)?;
        Ok(PulseOutcome::Fired)
    }

    /// Short the stack output for `pulse_ms`, if the reservoir can take it.
    pub fn short_circuit(
        &mut self,
        hw: &mut (impl DigitalPort + DelayNs),
        profile: &HardwareProfile,
        pulse_ms: u32,
        cap_mv: f32,
        sink: &mut impl EventSink,
    ) -> Result<PulseOutcome, HwError> {
        if !self.short_enabled {
            sink.emit(&ControllerEvent::ShortCircuitSkipped(SkipReason::Disabled));
            return Ok(PulseOutcome::Skipped(SkipReason::Disabled));
        }
        if cap_mv < profile.cap_threshold_mv {
            let reason = SkipReason::ReservoirLow { cap_mv };
            sink.emit(&ControllerEvent::ShortCircuitSkipped(reason));
            return Ok(PulseOutcome::Skipped(reason));
        }
        sink.emit(&ControllerEvent::ShortCircuit);
        pulse(hw, profile, profile.pins.short_circuit, pulse_ms)?;
        Ok(PulseOutcome::Fired)
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Disconnect load (if any), hold `pin` active for `pulse_ms`, reconnect.
fn pulse(
    hw: &mut (impl DigitalPort + DelayNs),
    profile: &HardwareProfile,
    pin: Pin,
    pulse_ms: u32,
) -> Result<(), HwError> {
    let load = profile.has_load_switch().then_some(profile.pins.load);

    if let Some(load) = load {
        drive(hw, profile, load, Logical::Inactive)?;
    }
    drive(hw, profile, pin, Logical::Active)?;
    hw.delay_ms(pulse_ms);
    drive(hw, profile, pin, Logical::Inactive)?;
    if let Some(load) = load {
        drive(hw, profile, load, Logical::Active)?;
    }

    debug!("pulse on pin {} done ({}ms)", pin.0, pulse_ms);
    Ok(())
}
