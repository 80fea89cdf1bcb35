//! Digital pin and analog channel assignments for the controller boards.
//!
//! Single source of truth: the hardware profile looks the pin map up here
//! rather than hard-coding numbers.  Board revision changes pin numbers
//! only; the analog channels are the same on every revision.

use core::fmt;

use crate::config::BoardRevision;

/// A digital I/O pin number as printed on the controller header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pin(pub u8);

/// Analog input channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogChannel {
    /// Stack output voltage through its resistor divider (A1).
    StackVoltage,
    /// Bidirectional hall current-sense chip output (A2).
    StackCurrent,
    /// Reservoir supercapacitor voltage through its divider (A3).
    CapacitorVoltage,
}

impl AnalogChannel {
    /// Header input number (`A<n>`).
    pub const fn index(self) -> u8 {
        match self {
            Self::StackVoltage => 1,
            Self::StackCurrent => 2,
            Self::CapacitorVoltage => 3,
        }
    }
}

impl fmt::Display for AnalogChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.index())
    }
}

/// Largest raw sample the 10-bit ADC returns.
pub const ADC_MAX: u16 = 1023;
/// Divisor used when converting raw samples to millivolts.
pub const ADC_FULL_SCALE: f32 = 1024.0;

/// Digital pin assignments for one board revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinMap {
    /// Purge solenoid valve.
    pub purge: Pin,
    /// Load disconnect switch (1.5W / 3W stacks only).
    pub load: Pin,
    /// Short-circuit mosfet.
    pub short_circuit: Pin,
    /// Status LED.
    pub status_led: Pin,
    /// Charge-pump square wave for the 12W / 30W mosfet gates.  Only the
    /// v1.0 board needs it, and it shares a pin with `load`.
    pub oscillator: Option<Pin>,
}

// ---------------------------------------------------------------------------
// v1.0: first prototypes
// ---------------------------------------------------------------------------

const V1_0: PinMap = PinMap {
    purge: Pin(2),
    load: Pin(3),
    short_circuit: Pin(4),
    status_led: Pin(5),
    oscillator: Some(Pin(3)),
};

// ---------------------------------------------------------------------------
// v1.2 / v1.3: production runs
// ---------------------------------------------------------------------------

const V1_2_V1_3: PinMap = PinMap {
    purge: Pin(3),
    load: Pin(4),
    short_circuit: Pin(5),
    status_led: Pin(6),
    oscillator: None,
};

/// Look up the pin map for a board revision.
pub const fn pin_map(revision: BoardRevision) -> PinMap {
    match revision {
        BoardRevision::V1_0 => V1_0,
        BoardRevision::V1_2 | BoardRevision::V1_3 => V1_2_V1_3,
    }
}
