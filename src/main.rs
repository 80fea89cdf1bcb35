//! Fuel-cell controller simulator — host entry point.
//!
//! Runs the controller core against the simulated stack adapter.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Adapters (outer ring)                │
//! │                                                      │
//! │  SimulatedStack (Digital+Analog+Clock+Delay)         │
//! │  LogEventSink (EventSink)                            │
//! │                                                      │
//! │  ─────────────── Port Trait Boundary ─────────────   │
//! │                                                      │
//! │  ┌────────────────────────────────────────────────┐  │
//! │  │        StackController (pure logic)            │  │
//! │  │  Scheduler · Sampler · Sequencer · Gate        │  │
//! │  └────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Usage: `fuelcell-sim [config.json] [polls]`

use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use fuelcell::adapters::hardware::SimulatedStack;
use fuelcell::adapters::log_sink::LogEventSink;
use fuelcell::app::service::StackController;
use fuelcell::config::ControllerConfig;

/// Poll cadence; must stay below the shortest interval.
const POLL_PERIOD: Duration = Duration::from_millis(100);
const DEFAULT_POLLS: u32 = 600;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);

    // ── 1. Configuration (selectors fixed before start) ──────
    let config = match args.next() {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading config {path}"))?;
            serde_json::from_str::<ControllerConfig>(&text)
                .with_context(|| format!("parsing config {path}"))?
        }
        None => ControllerConfig::default(),
    };
    let polls = match args.next() {
        Some(n) => n.parse::<u32>().context("poll count")?,
        None => DEFAULT_POLLS,
    };

    // ── 2. Resolve hardware, build adapters ──────────────────
    let mut controller = StackController::new(config).context("resolving hardware profile")?;
    let mut hw = SimulatedStack::new(*controller.profile());
    let mut sink = LogEventSink::new();

    // ── 3. Start (blocks on the reservoir) ───────────────────
    controller.start(&mut hw, &mut sink)?;

    // ── 4. Poll loop ─────────────────────────────────────────
    for _ in 0..polls {
        controller.poll(&mut hw, &mut sink)?;
        std::thread::sleep(POLL_PERIOD);
    }

    info!(
        "simulation done: {} short-circuits, {} purges, reservoir {:.0}mV",
        hw.short_pulses(),
        hw.purge_pulses(),
        hw.cap_mv()
    );
    Ok(())
}
