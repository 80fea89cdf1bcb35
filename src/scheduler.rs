//! Poll scheduler — four independent elapsed-time counters.
//!
//! Every [`PollScheduler::tick`] measures the wall-clock time since the
//! previous tick and adds it to all four counters.  A counter that is now
//! *strictly greater* than its interval fires and restarts from zero.
//!
//! ```text
//!   now ─▶ Δ = now − last_poll ─▶ +Δ on every counter
//!                                      │
//!          ┌──────────┬──────────┬─────┴──────┬──────────┐
//!          ▼          ▼          ▼            ▼
//!       Status     Sample   ShortCircuit    Purge        (fixed order)
//!       > 500     > 400     > interval    > interval
//! ```
//!
//! The evaluation order is fixed and decides precedence when two counters
//! cross in the same tick; both still fire in that tick.  Pulses executed
//! by the caller block, so their duration lands in the next tick's Δ.
//!
//! The short-circuit counter starts at a phase offset so that, with the
//! default profiles, it does not cross in the same tick as purge.  Nothing
//! keeps that relationship after a timing override.

use heapless::Vec;
use log::debug;

use crate::config::{
    SAMPLE_INTERVAL_MS, SHORT_CIRCUIT_PHASE_OFFSET_MS, STATUS_INTERVAL_MS, TimingProfile,
};

/// The four periodic actions, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledAction {
    /// Toggle the indicator and report the last reading.
    Status,
    /// Sample the electrical channels.
    Sample,
    ShortCircuit,
    Purge,
}

impl ScheduledAction {
    pub const ORDER: [Self; 4] = [Self::Status, Self::Sample, Self::ShortCircuit, Self::Purge];

    const fn index(self) -> usize {
        match self {
            Self::Status => 0,
            Self::Sample => 1,
            Self::ShortCircuit => 2,
            Self::Purge => 3,
        }
    }
}

/// Actions due in one tick, in evaluation order.
pub type DueActions = Vec<ScheduledAction, 4>;

#[derive(Debug, Clone, Copy)]
struct Counter {
    interval_ms: u32,
    elapsed_ms: u32,
}

/// The scheduler engine.  Owns no hardware; the caller runs the actions.
pub struct PollScheduler {
    counters: [Counter; 4],
    last_poll_ms: u64,
}

impl PollScheduler {
    /// Fresh counters for `timings`; the clock reference starts at `now_ms`.
    pub fn new(timings: &TimingProfile, now_ms: u64) -> Self {
        let counter = |interval_ms, elapsed_ms| Counter {
            interval_ms,
            elapsed_ms,
        };
        Self {
            counters: [
                counter(STATUS_INTERVAL_MS, 0),
                counter(SAMPLE_INTERVAL_MS, 0),
                counter(timings.short_circuit_interval_ms, SHORT_CIRCUIT_PHASE_OFFSET_MS),
                counter(timings.purge_interval_ms, 0),
            ],
            last_poll_ms: now_ms,
        }
    }

    /// Swap in new cycle intervals.  Counters keep their accumulated time.
    pub fn set_timings(&mut self, timings: &TimingProfile) {
        self.counters[ScheduledAction::ShortCircuit.index()].interval_ms =
            timings.short_circuit_interval_ms;
        self.counters[ScheduledAction::Purge.index()].interval_ms = timings.purge_interval_ms;
    }

    /// Advance all counters to `now_ms` and return the actions that fired.
    pub fn tick(&mut self, now_ms: u64) -> DueActions {
        let delta = now_ms.wrapping_sub(self.last_poll_ms);
        let delta = u32::try_from(delta).unwrap_or(u32::MAX);
        self.last_poll_ms = now_ms;

        let mut due = DueActions::new();
        for action in ScheduledAction::ORDER {
            let c = &mut self.counters[action.index()];
            c.elapsed_ms = c.elapsed_ms.saturating_add(delta);
            if c.elapsed_ms > c.interval_ms {
                debug!("scheduler: {:?} due after {}ms", action, c.elapsed_ms);
                c.elapsed_ms = 0;
                // capacity equals the number of actions
                let pushed = due.push(action);
                debug_assert!(pushed.is_ok());
            }
        }
        due
    }

    /// Time accumulated on `action`'s counter since it last fired.
    pub fn elapsed_ms(&self, action: ScheduledAction) -> u32 {
        self.counters[action.index()].elapsed_ms
    }

    pub fn interval_ms(&self, action: ScheduledAction) -> u32 {
        self.counters[action.index()].interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
