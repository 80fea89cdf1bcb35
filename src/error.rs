//! Unified error types for the stack controller.
//!
//! Only two things can go wrong: the configuration selectors do not name a
//! known board, or the platform I/O layer fails.  Skipped actuations
//! (disabled by the host, reservoir under-charged) are *not* errors; they
//! surface as [`ControllerEvent`](crate::app::events::ControllerEvent)s.
//! All variants are `Copy` so they can be passed through the poll loop
//! without allocation.

use core::fmt;

use crate::pins::{AnalogChannel, Pin};

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible operation in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The stack class / board revision selectors could not be resolved.
    Config(ConfigError),
    /// A platform digital or analog operation failed.  Fatal: the control
    /// loop has no fallback for lost sensing or lost actuation.
    Hardware(HwError),
    /// `poll()` was called before `start()` completed.
    NotStarted,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Hardware(e) => write!(f, "hardware: {e}"),
            Self::NotStarted => write!(f, "controller not started"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stack class selector is not one of 1.5W / 3W / 12W / 30W.
    UnknownStackClass,
    /// Board revision selector is not one of v1.0 / v1.2 / v1.3.
    UnknownBoardRevision,
    /// Both selectors are known but no board was built for the pair.
    UnsupportedCombination(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownStackClass => write!(f, "unknown stack class"),
            Self::UnknownBoardRevision => write!(f, "unknown board revision"),
            Self::UnsupportedCombination(why) => write!(f, "unsupported combination: {why}"),
        }
    }
}

impl core::error::Error for ConfigError {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Platform I/O errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    /// Setting a pin's direction failed.
    PinConfig(Pin),
    /// Driving a digital output failed.
    PinWrite(Pin),
    /// Starting the charge-pump square wave failed.
    Oscillator(Pin),
    /// Selecting the ADC reference failed.
    Reference,
    /// The ADC did not return a sample.
    AnalogRead(AnalogChannel),
    /// The ADC returned a sample above full scale.
    AnalogOutOfRange { channel: AnalogChannel, raw: u16 },
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinConfig(pin) => write!(f, "pin {} config failed", pin.0),
            Self::PinWrite(pin) => write!(f, "pin {} write failed", pin.0),
            Self::Oscillator(pin) => write!(f, "oscillator on pin {} failed", pin.0),
            Self::Reference => write!(f, "ADC reference select failed"),
            Self::AnalogRead(ch) => write!(f, "ADC read on {ch} failed"),
            Self::AnalogOutOfRange { channel, raw } => {
                write!(f, "ADC sample {raw} on {channel} out of range")
            }
        }
    }
}

impl core::error::Error for HwError {}

impl From<HwError> for Error {
    fn from(e: HwError) -> Self {
        Self::Hardware(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
