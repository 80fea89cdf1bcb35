//! Inbound commands to the controller.
//!
//! These are the host-side requests (serial console, supervisor task) that
//! [`StackController::handle_command`](super::service::StackController::handle_command)
//! interprets.  Permission changes take effect on the next scheduled firing,
//! never retroactively.

use crate::config::TimingProfile;

/// Commands the host can send into the controller core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    EnablePurge,
    DisablePurge,
    EnableShort,
    DisableShort,

    /// Replace the active timing profile wholesale.
    OverrideTimings(TimingProfile),

    /// Report the last-sampled voltage / current pair.
    Status,
}
