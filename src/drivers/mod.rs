//! Actuation drivers: the pulse sequencer and the status indicator.
//!
//! Every digital write from these drivers goes through [`drive`], which
//! applies the board's polarity rule.  Nothing here writes a raw level.

pub mod sequencer;
pub mod status_led;

use crate::app::ports::DigitalPort;
use crate::error::HwError;
use crate::pins::Pin;
use crate::profile::{HardwareProfile, Logical, physical_level};

/// Drive `pin` to the physical level for `state` on this board.
pub fn drive(
    hw: &mut impl DigitalPort,
    profile: &HardwareProfile,
    pin: Pin,
    state: Logical,
) -> Result<(), HwError> {
    hw.write_pin(pin, physical_level(state, profile))
}
