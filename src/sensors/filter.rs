//! Single-pole low-pass filter for the current-sense channel.
//!
//! `y ← y·α + x·(1−α)`.  State persists for the process lifetime; it is
//! only ever seeded, never reset.

/// Coefficient applied to the previous output.
pub const CURRENT_FILTER_ALPHA: f32 = 0.9;

/// Exponentially-weighted moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassFilter {
    alpha: f32,
    value: f32,
}

impl LowPassFilter {
    pub fn new(alpha: f32, seed: f32) -> Self {
        Self { alpha, value: seed }
    }

    /// Fold one sample in and return the new output.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.value = self.value * self.alpha + sample * (1.0 - self.alpha);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
