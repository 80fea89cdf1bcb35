//! Simulated stack adapter — a bench stand-in for the real board.
//!
//! Implements every platform port over a crude electrical model so the
//! controller can be exercised end-to-end on the host:
//!
//! - the reservoir charges exponentially towards the stack voltage while
//!   the stack is not shorted, and loses a fixed fraction per short pulse;
//! - stack current is the load current while the load switch (if any) is
//!   connected, plus a large spike while shorted;
//! - time comes from a [`HostClock`]; delays really sleep.
//!
//! Analog samples are produced by running the board's dividers and ADC
//! reference backwards, so the controller's conversions see realistic
//! raw counts.

use std::collections::HashMap;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::PinState;
use log::{debug, trace};

use crate::adapters::time::HostClock;
use crate::app::ports::{AnalogPort, ClockPort, DigitalPort};
use crate::error::HwError;
use crate::pins::{ADC_FULL_SCALE, ADC_MAX, AnalogChannel, Pin};
use crate::profile::{AnalogReference, HardwareProfile, Logical, physical_level};
use crate::sensors::SENSOR_GAIN_MV_PER_AMP;

/// Open-circuit stack voltage of the model (mV).
const STACK_MV: f32 = 7200.0;
/// Reservoir charging time constant (ms).
const CHARGE_TAU_MS: f32 = 2500.0;
/// Load current while connected (A).
const LOAD_AMPS: f32 = 0.8;
/// Extra current while the stack is shorted (A).
const SHORT_AMPS: f32 = 6.0;
/// Fraction of reservoir charge given up by one short pulse.
const SHORT_DRAIN: f32 = 0.08;

pub struct SimulatedStack {
    profile: HardwareProfile,
    clock: HostClock,
    levels: HashMap<Pin, PinState>,
    outputs: Vec<Pin>,
    reference: Option<AnalogReference>,
    cap_mv: f32,
    last_model_ms: u64,
    short_pulses: u32,
    purge_pulses: u32,
}

impl SimulatedStack {
    pub fn new(profile: HardwareProfile) -> Self {
        let clock = HostClock::new();
        let now = clock.now_millis();
        Self {
            profile,
            clock,
            levels: HashMap::new(),
            outputs: Vec::new(),
            reference: None,
            cap_mv: 0.0,
            last_model_ms: now,
            short_pulses: 0,
            purge_pulses: 0,
        }
    }

    pub fn short_pulses(&self) -> u32 {
        self.short_pulses
    }

    pub fn purge_pulses(&self) -> u32 {
        self.purge_pulses
    }

    pub fn cap_mv(&self) -> f32 {
        self.cap_mv
    }

    fn is_active(&self, pin: Pin) -> bool {
        self.levels.get(&pin) == Some(&physical_level(Logical::Active, &self.profile))
    }

    fn load_connected(&self) -> bool {
        !self.profile.has_load_switch() || self.is_active(self.profile.pins.load)
    }

    fn shorted(&self) -> bool {
        self.is_active(self.profile.pins.short_circuit)
    }

    /// Advance the reservoir model to the current time.
    fn step_model(&mut self) {
        let now = self.clock.now_millis();
        let dt = now.saturating_sub(self.last_model_ms) as f32;
        self.last_model_ms = now;
        if !self.shorted() {
            let k = 1.0 - (-dt / CHARGE_TAU_MS).exp();
            self.cap_mv += (STACK_MV - self.cap_mv) * k;
        }
    }

    fn to_raw(&self, mv: f32) -> u16 {
        let ref_mv = self.reference.unwrap_or(AnalogReference::Internal).millivolts();
        let raw = mv * ADC_FULL_SCALE / ref_mv;
        raw.clamp(0.0, f32::from(ADC_MAX)) as u16
    }
}

impl DigitalPort for SimulatedStack {
    fn configure_output(&mut self, pin: Pin) -> Result<(), HwError> {
        if !self.outputs.contains(&pin) {
            self.outputs.push(pin);
        }
        Ok(())
    }

    fn write_pin(&mut self, pin: Pin, level: PinState) -> Result<(), HwError> {
        if !self.outputs.contains(&pin) {
            return Err(HwError::PinWrite(pin));
        }
        self.step_model();
        let was_active = self.is_active(pin);
        self.levels.insert(pin, level);
        let now_active = self.is_active(pin);

        if !was_active && now_active {
            if pin == self.profile.pins.short_circuit {
                self.short_pulses += 1;
                self.cap_mv *= 1.0 - SHORT_DRAIN;
            } else if pin == self.profile.pins.purge {
                self.purge_pulses += 1;
            }
        }
        trace!("sim: pin {} -> {:?}", pin.0, level);
        Ok(())
    }

    fn start_square_wave(&mut self, pin: Pin, duty_percent: u8) -> Result<(), HwError> {
        debug!("sim: square wave on pin {} at {}%", pin.0, duty_percent);
        Ok(())
    }
}

impl AnalogPort for SimulatedStack {
    fn set_reference(&mut self, reference: AnalogReference) -> Result<(), HwError> {
        self.reference = Some(reference);
        Ok(())
    }

    fn read_analog(&mut self, channel: AnalogChannel) -> Result<u16, HwError> {
        self.step_model();
        let p = &self.profile;
        let mv = match channel {
            AnalogChannel::CapacitorVoltage => self.cap_mv / p.cap_divider,
            AnalogChannel::StackVoltage => {
                let stack = if self.shorted() { 0.0 } else { STACK_MV };
                stack / p.stack_divider
            }
            AnalogChannel::StackCurrent => {
                let mut amps = if self.load_connected() { LOAD_AMPS } else { 0.0 };
                if self.shorted() {
                    amps += SHORT_AMPS;
                }
                p.stack_class.current_sense_supply_mv() / 2.0 + amps * SENSOR_GAIN_MV_PER_AMP
            }
        };
        Ok(self.to_raw(mv))
    }
}

impl ClockPort for SimulatedStack {
    fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }
}

impl DelayNs for SimulatedStack {
    fn delay_ns(&mut self, ns: u32) {
        self.clock.delay_ns(ns);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.clock.delay_ms(ms);
    }
}
