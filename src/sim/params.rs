//! Live wave parameters
//!
//! Three channels the parameter panel can change between ticks. Writes are
//! clamped into each channel's range; non-finite writes are ignored.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::ConfigError;

pub const WAVE_LENGTH_RANGE: RangeInclusive<f32> = 0.0..=20.0;
pub const AMPLITUDE_RANGE: RangeInclusive<f32> = 3.0..=10.0;
pub const VELOCITY_RANGE: RangeInclusive<f32> = 0.0..=0.2;

/// Wave tuning knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveParams {
    /// Phase offset spread across the distance span
    wave_length: f32,
    /// Crest height (the trough is fixed)
    amplitude: f32,
    /// Phase advance per simulation step
    velocity: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            wave_length: 20.0,
            amplitude: 5.0,
            velocity: 0.08,
        }
    }
}

fn clamp_channel(name: &str, value: f32, range: &RangeInclusive<f32>) -> Option<f32> {
    if !value.is_finite() {
        log::warn!("Ignoring non-finite {} = {}", name, value);
        return None;
    }
    Some(value.clamp(*range.start(), *range.end()))
}

fn check_channel(
    field: &'static str,
    value: f32,
    range: &RangeInclusive<f32>,
) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite {
            field,
            value: value as f64,
        });
    }
    if !range.contains(&value) {
        return Err(ConfigError::OutOfRange {
            field,
            value: value as f64,
            min: *range.start() as f64,
            max: *range.end() as f64,
        });
    }
    Ok(())
}

impl WaveParams {
    /// Build from raw values, clamping each into range
    pub fn new(wave_length: f32, amplitude: f32, velocity: f32) -> Self {
        let mut params = Self::default();
        params.set_wave_length(wave_length);
        params.set_amplitude(amplitude);
        params.set_velocity(velocity);
        params
    }

    pub fn wave_length(&self) -> f32 {
        self.wave_length
    }

    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn set_wave_length(&mut self, value: f32) {
        if let Some(v) = clamp_channel("wave_length", value, &WAVE_LENGTH_RANGE) {
            self.wave_length = v;
        }
    }

    pub fn set_amplitude(&mut self, value: f32) {
        if let Some(v) = clamp_channel("amplitude", value, &AMPLITUDE_RANGE) {
            self.amplitude = v;
        }
    }

    pub fn set_velocity(&mut self, value: f32) {
        if let Some(v) = clamp_channel("velocity", value, &VELOCITY_RANGE) {
            self.velocity = v;
        }
    }

    /// Check every channel is in range (deserialized values skip the setters)
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_channel("wave.wave_length", self.wave_length, &WAVE_LENGTH_RANGE)?;
        check_channel("wave.amplitude", self.amplitude, &AMPLITUDE_RANGE)?;
        check_channel("wave.velocity", self.velocity, &VELOCITY_RANGE)?;
        Ok(())
    }
}
