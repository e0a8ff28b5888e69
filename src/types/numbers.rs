// Copyright (c) 2024 Mike Tsao

//! Numeric types used throughout the system.

use core::ops::{Add, Mul, Sub};
use serde::{Deserialize, Serialize};

/// The primitive Rust type of a single rendered audio sample. Rendered values
/// occupy the low 24 bits of the 32-bit word.
pub type SampleType = i32;

/// [Sample] represents a single-channel, fixed-width audio sample as produced
/// by a paxel renderer.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Sample(pub SampleType);
impl Sample {
    /// The [SampleType] value of silence.
    pub const SILENCE_VALUE: SampleType = 0;
    /// A [Sample] that is silent.
    pub const SILENCE: Sample = Sample(Self::SILENCE_VALUE);
    /// The maximum positive [SampleType] value (24-bit full scale).
    pub const MAX_VALUE: SampleType = 0x7F_FFFF;
    /// A [Sample] having the maximum positive value.
    pub const MAX: Sample = Sample(Self::MAX_VALUE);
    /// The maximum negative [SampleType] value.
    pub const MIN_VALUE: SampleType = -Self::MAX_VALUE;
    /// A [Sample] having the maximum negative value.
    pub const MIN: Sample = Sample(Self::MIN_VALUE);

    /// Converts a floating-point signal value in [-1.0, 1.0] to a [Sample].
    /// Out-of-range values are clamped to full scale.
    pub fn from_signal(value: f64) -> Self {
        let scaled = (value.clamp(-1.0, 1.0) * Self::MAX_VALUE as f64).round();
        Self(scaled as SampleType)
    }
}
impl From<SampleType> for Sample {
    fn from(value: SampleType) -> Self {
        Sample(value)
    }
}
impl From<Sample> for SampleType {
    fn from(value: Sample) -> Self {
        value.0
    }
}

/// Frequency in Hertz. For a partial, any positive finite number.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FrequencyHz(pub f64);
impl FrequencyHz {
    /// Whether this frequency can drive an oscillator.
    pub fn is_valid(&self) -> bool {
        self.0.is_finite() && self.0 > 0.0
    }
}
impl From<f64> for FrequencyHz {
    fn from(value: f64) -> Self {
        Self(value)
    }
}
impl From<FrequencyHz> for f64 {
    fn from(value: FrequencyHz) -> Self {
        value.0
    }
}
impl Add for FrequencyHz {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl Sub for FrequencyHz {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl Mul<f64> for FrequencyHz {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self::Output {
        Self(self.0 * rhs)
    }
}
impl core::fmt::Display for FrequencyHz {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:.2}Hz", self.0)
    }
}
