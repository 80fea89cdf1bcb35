//! Fuel-cell stack controller library.
//!
//! Periodic maintenance for PEM stacks: gas purge, short-circuit
//! conditioning, electrical monitoring and the reservoir pre-charge gate.
//! The core talks to the platform only through the port traits in
//! [`app::ports`], so it runs unchanged on the board and on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod pins;
pub mod profile;
pub mod scheduler;

pub mod adapters;
pub mod drivers;
pub mod sensors;
