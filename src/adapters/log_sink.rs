//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing controller events through the `log`
//! facade (serial console on the board, stderr in the simulator).  Lines
//! keep the wording operators already know from the bench controllers.

use log::{info, warn};

use crate::app::events::{Action, ControllerEvent, SkipReason};
use crate::app::ports::EventSink;
use crate::config::TimingProfile;

/// Adapter that logs every [`ControllerEvent`].
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &ControllerEvent) {
        match event {
            ControllerEvent::Identity {
                stack_class,
                board_revision,
            } => {
                info!("ArcolaEnergy fuel cell controller for {}", stack_class);
                info!("Hardware version {}", board_revision);
            }
            ControllerEvent::Timings(t) => {
                let (short, purge) = timing_lines(t);
                info!("{}", short);
                info!("{}", purge);
            }
            ControllerEvent::TimingsOverridden => info!("override timings..."),
            ControllerEvent::WaitingForCharge => info!("waiting for caps to charge"),
            ControllerEvent::ChargeProgress { cap_mv } => info!("cap: {:.0}mv", cap_mv),
            ControllerEvent::Charged => info!("CHARGED"),
            ControllerEvent::Status { volts, amps } => info!("{}", status_line(*volts, *amps)),
            ControllerEvent::Purge => info!("PURGE"),
            ControllerEvent::ShortCircuit => info!("SHORT-CIRCUIT"),
            ControllerEvent::PurgeSkipped(_) => info!("USER REQUESTS SKIPPING PURGE"),
            ControllerEvent::ShortCircuitSkipped(SkipReason::Disabled) => {
                info!("USER REQUESTS SKIPPING SHORT-CIRCUIT");
            }
            ControllerEvent::ShortCircuitSkipped(SkipReason::ReservoirLow { cap_mv }) => {
                warn!("SKIPPING SHORT-CIRCUIT AS SUPERCAP VOLTAGE TOO LOW ({:.0}mv)", cap_mv);
            }
            ControllerEvent::PermissionChanged { action, enabled } => {
                let name = match action {
                    Action::Purge => "purge",
                    Action::ShortCircuit => "short-circuit",
                };
                info!("{} {}", name, if *enabled { "enabled" } else { "disabled" });
            }
        }
    }
}

/// `"12.00V, 0.50A"`
pub fn status_line(volts: f32, amps: f32) -> String {
    format!("{:.2}V, {:.2}A", volts, amps)
}

/// The two "<pulse>ms every <n> s" lines for a profile.  Intervals are
/// shown in whole seconds, truncated.
pub fn timing_lines(t: &TimingProfile) -> (String, String) {
    (
        format!(
            "Short-circuit: {}ms every {} s",
            t.short_circuit_pulse_ms,
            t.short_circuit_interval_ms / 1000
        ),
        format!(
            "Purge: {}ms every {} s",
            t.purge_pulse_ms,
            t.purge_interval_ms / 1000
        ),
    )
}
