//! Hardware profile — everything the (stack class, board revision) pair fixes.
//!
//! Resolved once before `start()` and immutable afterwards.  The divider
//! ratios are the resistor networks fitted on each board; the v1.2/v1.3
//! small-stack ratio has not been bench-verified.
//!
//! Polarity: the logical actuation states are translated to physical pin
//! levels by [`physical_level`], the only place that knows which boards
//! drive their mosfets through an inverting gate stage.

use embedded_hal::digital::PinState;

use crate::config::{BoardRevision, ControllerConfig, StackClass};
use crate::error::ConfigError;
use crate::pins::{self, PinMap};

/// Capacitor voltage the reservoir must reach before start-up completes
/// and short-circuits are allowed.
pub const CAP_CHARGED_MV: f32 = 3500.0;

/// Logical state of an actuation output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Logical {
    Active,
    Inactive,
}

impl Logical {
    pub const fn from_bool(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}

/// Which ADC reference the board wires up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalogReference {
    /// Fixed internal 5000 mV reference (v1.0).
    Internal,
    /// 3300 mV regulator routed to AREF (v1.2 / v1.3).
    External,
}

impl AnalogReference {
    pub const fn millivolts(self) -> f32 {
        match self {
            Self::Internal => 5000.0,
            Self::External => 3300.0,
        }
    }
}

/// Immutable per-board constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HardwareProfile {
    pub stack_class: StackClass,
    pub board_revision: BoardRevision,
    pub pins: PinMap,
    pub reference: AnalogReference,
    /// Capacitor-voltage divider ratio (board revision only).
    pub cap_divider: f32,
    /// Stack-voltage divider ratio (class and revision).
    pub stack_divider: f32,
    pub cap_threshold_mv: f32,
    /// Whether actuation outputs are driven active-low.
    pub inverted: bool,
}

impl HardwareProfile {
    /// Look up the profile for a configuration.
    ///
    /// The 12W / 30W stacks were never built on the v1.2 board, so that
    /// pair has no defined gate polarity and is refused.
    pub fn resolve(config: &ControllerConfig) -> Result<Self, ConfigError> {
        let ControllerConfig {
            stack_class,
            board_revision,
        } = *config;

        let small = stack_class.has_load_switch();
        let (reference, cap_divider, stack_divider) = match board_revision {
            BoardRevision::V1_0 => {
                // R1=226k R2=100k on the large-stack input
                let stack = if small { 1.0 } else { 326.0 / 100.0 };
                (AnalogReference::Internal, 1.0, stack)
            }
            BoardRevision::V1_2 | BoardRevision::V1_3 => {
                // R1=75k R2=22k on the large-stack input
                let stack = if small { 2.0 } else { 97.0 / 22.0 };
                (AnalogReference::External, 2.0, stack)
            }
        };

        let inverted = match (small, board_revision) {
            (true, _) => false,
            (false, BoardRevision::V1_0) => true,
            (false, BoardRevision::V1_3) => false,
            (false, BoardRevision::V1_2) => {
                return Err(ConfigError::UnsupportedCombination(
                    "12W/30W stacks have no v1.2 board",
                ));
            }
        };

        Ok(Self {
            stack_class,
            board_revision,
            pins: pins::pin_map(board_revision),
            reference,
            cap_divider,
            stack_divider,
            cap_threshold_mv: CAP_CHARGED_MV,
            inverted,
        })
    }

    pub const fn reference_mv(&self) -> f32 {
        self.reference.millivolts()
    }

    pub const fn has_load_switch(&self) -> bool {
        self.stack_class.has_load_switch()
    }

    /// The large stacks on the v1.0 board need the charge-pump square wave.
    pub fn needs_charge_pump(&self) -> bool {
        !self.has_load_switch() && self.pins.oscillator.is_some()
    }
}

/// Translate a logical actuation state into the pin level for this board.
pub fn physical_level(state: Logical, profile: &HardwareProfile) -> PinState {
    let high = matches!(state, Logical::Active) != profile.inverted;
    PinState::from(high)
}
