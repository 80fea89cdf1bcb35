//! Outbound controller events.
//!
//! The [`StackController`](super::service::StackController) emits these
//! through the [`EventSink`](super::ports::EventSink) port.  There is no
//! separate alerting channel; every transition is announced here.

use crate::config::{BoardRevision, StackClass, TimingProfile};

/// Why a scheduled actuation did not run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The host disabled this action.
    Disabled,
    /// Reservoir below the charge threshold (short-circuit only).
    ReservoirLow { cap_mv: f32 },
}

/// Structured events emitted by the controller core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControllerEvent {
    /// Resolved hardware identity, emitted once at start.
    Identity {
        stack_class: StackClass,
        board_revision: BoardRevision,
    },

    /// The active timing profile (at start and after every override).
    Timings(TimingProfile),

    /// `overrideTimings` replaced the profile.
    TimingsOverridden,

    /// Start-up gate entered.
    WaitingForCharge,

    /// One start-up gate sample.
    ChargeProgress { cap_mv: f32 },

    /// Reservoir crossed the threshold; start-up complete.
    Charged,

    /// Last-sampled stack reading.
    Status { volts: f32, amps: f32 },

    /// Purge pulse started.
    Purge,

    /// Short-circuit pulse started.
    ShortCircuit,

    PurgeSkipped(SkipReason),

    ShortCircuitSkipped(SkipReason),

    /// A permission flag changed.
    PermissionChanged { action: Action, enabled: bool },
}

/// The two gated maintenance actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Purge,
    ShortCircuit,
}
