//! Application core — controller logic, zero direct I/O.
//!
//! This module holds the control rules: start-up gating, the poll loop and
//! host command handling.  All interaction with hardware happens through
//! the **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod startup;
