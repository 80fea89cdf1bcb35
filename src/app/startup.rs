//! Start-up gate.
//!
//! The controller is unusable until the reservoir capacitor is charged:
//! purge and short-circuit both assume stored energy.  [`wait_for_charge`]
//! therefore busy-waits, sampling and blinking every 200 ms, with no
//! timeout and no way to cancel.

use embedded_hal::delay::DelayNs;
use log::info;

use crate::app::events::ControllerEvent;
use crate::app::ports::{AnalogPort, DigitalPort, EventSink};
use crate::config::{ANNOUNCE_BLINK_MS, CHARGE_WAIT_MS};
use crate::drivers::status_led::StatusIndicator;
use crate::error::HwError;
use crate::profile::HardwareProfile;
use crate::sensors::ElectricalSampler;

/// Three quick blinks to show the controller has come up.
pub fn announce(
    hw: &mut (impl DigitalPort + DelayNs),
    profile: &HardwareProfile,
    indicator: &mut StatusIndicator,
) -> Result<(), HwError> {
    for _ in 0..3 {
        indicator.toggle(hw, profile)?;
        hw.delay_ms(ANNOUNCE_BLINK_MS);
    }
    Ok(())
}

/// Block until the sampled capacitor voltage reaches the profile threshold.
/// Returns the voltage that satisfied the gate.
pub fn wait_for_charge(
    hw: &mut (impl AnalogPort + DigitalPort + DelayNs),
    profile: &HardwareProfile,
    sampler: &mut ElectricalSampler,
    indicator: &mut StatusIndicator,
    sink: &mut impl EventSink,
) -> Result<f32, HwError> {
    sink.emit(&ControllerEvent::WaitingForCharge);

    let mut cap_mv = sampler.last().cap_mv;
    let mut samples: u32 = 0;
    while cap_mv < profile.cap_threshold_mv {
        cap_mv = sampler.sample(hw)?.cap_mv;
        samples += 1;
        sink.emit(&ControllerEvent::ChargeProgress { cap_mv });
        indicator.toggle(hw, profile)?;
        hw.delay_ms(CHARGE_WAIT_MS);
    }

    info!("reservoir charged to {:.0}mV after {} samples", cap_mv, samples);
    sink.emit(&ControllerEvent::Charged);
    Ok(cap_mv)
}
