//! Port traits — the hexagonal boundary between controller logic and the platform.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ StackController (domain)
//! ```
//!
//! The platform (GPIO driver, ADC, clock, delay) implements these traits.
//! The [`StackController`](super::service::StackController) borrows them
//! through generics on every driving call, so the domain core never touches
//! hardware directly and tests can inject a scripted platform with a fake
//! clock.
//!
//! Blocking sleep is not a port of our own: the controller uses
//! [`embedded_hal::delay::DelayNs`].

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;

use crate::error::HwError;
use crate::pins::{AnalogChannel, Pin};
use crate::profile::AnalogReference;

// ───────────────────────────────────────────────────────────────
// Digital port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the digital outputs.
///
/// Levels passed here are already physical; the controller translates
/// logical states through [`physical_level`](crate::profile::physical_level)
/// before calling in.
pub trait DigitalPort {
    /// Configure `pin` as a push-pull output.
    fn configure_output(&mut self, pin: Pin) -> Result<(), HwError>;

    /// Drive `pin` to `level`.
    fn write_pin(&mut self, pin: Pin, level: PinState) -> Result<(), HwError>;

    /// Start a free-running square wave on `pin` (charge-pump drive).
    fn start_square_wave(&mut self, pin: Pin, duty_percent: u8) -> Result<(), HwError>;
}

// ───────────────────────────────────────────────────────────────
// Analog port (hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the ADC.
pub trait AnalogPort {
    /// Select the ADC reference.
    fn set_reference(&mut self, reference: AnalogReference) -> Result<(), HwError>;

    /// Read one raw sample in `0..=ADC_MAX`.
    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, HwError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

/// Monotonic millisecond clock.
pub trait ClockPort {
    fn now_millis(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Platform bundle
// ───────────────────────────────────────────────────────────────

/// Everything the controller needs from the platform in one bound.
///
/// A single adapter usually implements all four, which avoids a double
/// mutable borrow when the same peripheral block owns GPIO, ADC and timer.
pub trait Platform: DigitalPort + AnalogPort + ClockPort + DelayNs {}

impl<T: DigitalPort + AnalogPort + ClockPort + DelayNs> Platform for T {}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The controller announces every state transition through this port.
/// Emission is best-effort: sinks must not fail.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::ControllerEvent);
}
