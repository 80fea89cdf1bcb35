//! Electrical sampler — the three analog channels and their conversions.
//!
//! Each [`ElectricalSampler::sample`] reads the capacitor, stack-voltage and
//! stack-current channels once, in that order.  Voltage channels are scaled
//! straight through the board's divider; the current channel goes through
//! the [`LowPassFilter`] first and is then converted with the hall sensor's
//! offset-and-gain model:
//!
//! ```text
//! amps = (mV − supply/2) / 185 mV·A⁻¹
//! ```
//!
//! Negative amps mean reverse or no current.  Because the filter is never
//! reset, the reported current lags the true current by roughly
//! `sample_interval / (1 − α)`.

pub mod filter;

use crate::app::ports::AnalogPort;
use crate::error::HwError;
use crate::pins::{ADC_FULL_SCALE, ADC_MAX, AnalogChannel};
use crate::profile::HardwareProfile;
pub use filter::{CURRENT_FILTER_ALPHA, LowPassFilter};

/// Current-sense chip sensitivity.
pub const SENSOR_GAIN_MV_PER_AMP: f32 = 185.0;

/// Values from the most recent sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElectricalReading {
    /// Stack output voltage (V).
    pub stack_volts: f32,
    /// Filtered stack current (A).
    pub stack_amps: f32,
    /// Reservoir capacitor voltage (mV).
    pub cap_mv: f32,
}

pub struct ElectricalSampler {
    reference_mv: f32,
    cap_divider: f32,
    stack_divider: f32,
    supply_mv: f32,
    current: LowPassFilter,
    last: ElectricalReading,
}

impl ElectricalSampler {
    /// Build a sampler for `profile` with the current filter seeded at
    /// the sensor's zero-current output, so the first reading is not
    /// spuriously negative.
    pub fn new(profile: &HardwareProfile) -> Self {
        let reference_mv = profile.reference_mv();
        let supply_mv = profile.stack_class.current_sense_supply_mv();
        let zero_raw = (supply_mv / 2.0) * ADC_FULL_SCALE / reference_mv;
        Self {
            reference_mv,
            cap_divider: profile.cap_divider,
            stack_divider: profile.stack_divider,
            supply_mv,
            current: LowPassFilter::new(CURRENT_FILTER_ALPHA, zero_raw),
            last: ElectricalReading::default(),
        }
    }

    /// Read all three channels and update the stored reading.
    pub fn sample(&mut self, adc: &mut impl AnalogPort) -> Result<ElectricalReading, HwError> {
        let cap_raw = read_checked(adc, AnalogChannel::CapacitorVoltage)?;
        let stack_raw = read_checked(adc, AnalogChannel::StackVoltage)?;
        let current_raw = read_checked(adc, AnalogChannel::StackCurrent)?;

        let filtered = self.current.update(f32::from(current_raw));

        self.last = ElectricalReading {
            stack_volts: self.stack_divider * self.raw_to_mv(f32::from(stack_raw)) / 1000.0,
            stack_amps: self.raw_to_amps(filtered),
            cap_mv: self.cap_divider * self.raw_to_mv(f32::from(cap_raw)),
        };
        Ok(self.last)
    }

    pub fn last(&self) -> ElectricalReading {
        self.last
    }

    /// Current filter state, in raw ADC counts.
    pub fn filtered_current_raw(&self) -> f32 {
        self.current.value()
    }

    fn raw_to_mv(&self, raw: f32) -> f32 {
        self.reference_mv / ADC_FULL_SCALE * raw
    }

    /// Convert a (filtered) raw current-sense sample to amps.
    pub fn raw_to_amps(&self, raw: f32) -> f32 {
        (self.raw_to_mv(raw) - self.supply_mv / 2.0) / SENSOR_GAIN_MV_PER_AMP
    }
}

fn read_checked(adc: &mut impl AnalogPort, channel: AnalogChannel) -> Result<u16, HwError> {
    let raw = adc.read_analog(channel)?;
    if raw > ADC_MAX {
        return Err(HwError::AnalogOutOfRange { channel, raw });
    }
    Ok(raw)
}
