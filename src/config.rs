//! Controller configuration.
//!
//! Two selectors fix the hardware: the stack class (power rating of the
//! fuel-cell stack) and the board revision.  Both must be chosen before
//! `start()`; they are never changed at runtime.  The [`TimingProfile`]
//! has a class-specific default and may be replaced wholesale by the host.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// --- Fixed cadences (ms) ---

/// How often the status indicator toggles and the reading is reported.
pub const STATUS_INTERVAL_MS: u32 = 500;
/// How often the electrical channels are sampled.
pub const SAMPLE_INTERVAL_MS: u32 = 400;
/// Initial value of the short-circuit counter so it starts out of phase with purge.
pub const SHORT_CIRCUIT_PHASE_OFFSET_MS: u32 = 5000;
/// Sleep between samples while waiting for the reservoir to charge.
pub const CHARGE_WAIT_MS: u32 = 200;
/// Spacing of the three start-up announce blinks.
pub const ANNOUNCE_BLINK_MS: u32 = 100;

// ---------------------------------------------------------------------------
// Stack class
// ---------------------------------------------------------------------------

/// Power rating of the stack being controlled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum StackClass {
    W1_5,
    W3,
    W12,
    W30,
}

impl StackClass {
    pub const ALL: [Self; 4] = [Self::W1_5, Self::W3, Self::W12, Self::W30];

    pub const fn label(self) -> &'static str {
        match self {
            Self::W1_5 => "1.5W",
            Self::W3 => "3W",
            Self::W12 => "12W",
            Self::W30 => "30W",
        }
    }

    /// Only the small stacks have a controllable load switch.
    pub const fn has_load_switch(self) -> bool {
        matches!(self, Self::W1_5 | Self::W3)
    }

    /// Supply rail of the current-sense chip; its zero-current output sits at half of it.
    pub const fn current_sense_supply_mv(self) -> f32 {
        match self {
            // powered from the board's own 5V regulator
            Self::W1_5 | Self::W3 => 5020.0,
            // powered from the host supply
            Self::W12 | Self::W30 => 5000.0,
        }
    }
}

impl TryFrom<u8> for StackClass {
    type Error = ConfigError;

    /// Legacy numeric selector codes (1 = 1.5W ... 4 = 30W).
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::W1_5),
            2 => Ok(Self::W3),
            3 => Ok(Self::W12),
            4 => Ok(Self::W30),
            _ => Err(ConfigError::UnknownStackClass),
        }
    }
}

impl FromStr for StackClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_suffix(['W', 'w']).unwrap_or(s);
        match s {
            "1.5" => Ok(Self::W1_5),
            "3" => Ok(Self::W3),
            "12" => Ok(Self::W12),
            "30" => Ok(Self::W30),
            _ => Err(ConfigError::UnknownStackClass),
        }
    }
}

impl TryFrom<String> for StackClass {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<StackClass> for &'static str {
    fn from(class: StackClass) -> Self {
        class.label()
    }
}

impl fmt::Display for StackClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Board revision
// ---------------------------------------------------------------------------

/// Control-board hardware revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum BoardRevision {
    /// First prototypes.
    V1_0,
    /// Production run for the 1.5W / 3W stacks.
    V1_2,
    /// Production run for the 12W / 30W stacks.
    V1_3,
}

impl BoardRevision {
    pub const ALL: [Self; 3] = [Self::V1_0, Self::V1_2, Self::V1_3];

    pub const fn label(self) -> &'static str {
        match self {
            Self::V1_0 => "v1.0",
            Self::V1_2 => "v1.2",
            Self::V1_3 => "v1.3",
        }
    }
}

impl TryFrom<u8> for BoardRevision {
    type Error = ConfigError;

    /// Legacy numeric selector codes (1 = v1.0, 2 = v1.2, 3 = v1.3).
    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::V1_0),
            2 => Ok(Self::V1_2),
            3 => Ok(Self::V1_3),
            _ => Err(ConfigError::UnknownBoardRevision),
        }
    }
}

impl FromStr for BoardRevision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s.strip_prefix(['v', 'V']).unwrap_or(s);
        match s {
            "1.0" => Ok(Self::V1_0),
            "1.2" => Ok(Self::V1_2),
            "1.3" => Ok(Self::V1_3),
            _ => Err(ConfigError::UnknownBoardRevision),
        }
    }
}

impl TryFrom<String> for BoardRevision {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<BoardRevision> for &'static str {
    fn from(rev: BoardRevision) -> Self {
        rev.label()
    }
}

impl fmt::Display for BoardRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Controller configuration
// ---------------------------------------------------------------------------

/// The two hardware selectors, fixed before `start()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    pub stack_class: StackClass,
    pub board_revision: BoardRevision,
}

impl ControllerConfig {
    pub const fn new(stack_class: StackClass, board_revision: BoardRevision) -> Self {
        Self {
            stack_class,
            board_revision,
        }
    }

    /// Build from the legacy numeric selector codes.
    pub fn from_codes(stack_class: u8, board_revision: u8) -> Result<Self, ConfigError> {
        Ok(Self::new(
            StackClass::try_from(stack_class)?,
            BoardRevision::try_from(board_revision)?,
        ))
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self::new(StackClass::W12, BoardRevision::V1_3)
    }
}

// ---------------------------------------------------------------------------
// Timing profile
// ---------------------------------------------------------------------------

/// Interval / pulse pairs for the two maintenance cycles, in milliseconds.
///
/// Each pulse must be strictly shorter than its own interval and than the
/// other cycle's interval.  This is not enforced; [`TimingProfile::check`]
/// only reports a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingProfile {
    pub short_circuit_interval_ms: u32,
    pub short_circuit_pulse_ms: u32,
    pub purge_interval_ms: u32,
    pub purge_pulse_ms: u32,
}

impl TimingProfile {
    pub const fn new(
        short_circuit_interval_ms: u32,
        short_circuit_pulse_ms: u32,
        purge_interval_ms: u32,
        purge_pulse_ms: u32,
    ) -> Self {
        Self {
            short_circuit_interval_ms,
            short_circuit_pulse_ms,
            purge_interval_ms,
            purge_pulse_ms,
        }
    }

    /// Default profile for a stack class.
    pub const fn for_class(class: StackClass) -> Self {
        match class {
            StackClass::W1_5 | StackClass::W3 => Self::new(10_000, 100, 60_000, 100),
            StackClass::W12 => Self::new(10_000, 100, 25_000, 100),
            StackClass::W30 => Self::new(10_000, 100, 10_000, 100),
        }
    }

    /// Report the first pulse/interval ordering this profile breaks.
    pub fn check(&self) -> Result<(), &'static str> {
        if self.short_circuit_pulse_ms >= self.short_circuit_interval_ms {
            return Err("short-circuit pulse not shorter than its interval");
        }
        if self.purge_pulse_ms >= self.purge_interval_ms {
            return Err("purge pulse not shorter than its interval");
        }
        if self.short_circuit_pulse_ms >= self.purge_interval_ms {
            return Err("short-circuit pulse not shorter than purge interval");
        }
        if self.purge_pulse_ms >= self.short_circuit_interval_ms {
            return Err("purge pulse not shorter than short-circuit interval");
        }
        Ok(())
    }
}
