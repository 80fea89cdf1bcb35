//! Status indicator LED.
//!
//! A single digital output that alternates on every call to [`toggle`].
//! The level written is the one held *before* the flip, so the very first
//! toggle drives the LED inactive.
//!
//! [`toggle`]: StatusIndicator::toggle

use crate::app::ports::DigitalPort;
use crate::error::HwError;
use crate::profile::{HardwareProfile, Logical};

use super::drive;

pub struct StatusIndicator {
    lit: bool,
}

impl StatusIndicator {
    pub fn new() -> Self {
        Self { lit: false }
    }

    pub fn toggle(
        &mut self,
        hw: &mut impl DigitalPort,
        profile: &HardwareProfile,
    ) -> Result<(), HwError> {
        drive(hw, profile, profile.pins.status_led, Logical::from_bool(self.lit))?;
        self.lit = !self.lit;
        Ok(())
    }

    /// State the next toggle will write.
    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new()
    }
}
