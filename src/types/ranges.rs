// Copyright (c) 2024 Mike Tsao

use core::{
    fmt::Display,
    ops::{Add, RangeInclusive, Sub},
};
use serde::{Deserialize, Serialize};

/// [RangedF64] enforces the given range limits while not becoming too expensive
/// to use compared to a plain f64. It clamps at creation and when converting
/// from an f64. Math operations (Add, Sub) are not checked, so interpolation
/// can overshoot slightly before being clamped again on the way out.
///
/// Note that [RangedF64] doesn't tell you when clamping happens. Code that
/// must reject out-of-range input (for example, envelope levels) should check
/// [RangedF64::contains()] on the raw f64 before converting.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RangedF64<const LOWER: i8, const UPPER: i8>(pub f64);
#[allow(missing_docs)]
impl<const LOWER: i8, const UPPER: i8> RangedF64<LOWER, UPPER> {
    /// The highest valid value.
    pub const MAX: f64 = UPPER as f64;
    /// The lowest valid value.
    pub const MIN: f64 = LOWER as f64;
    /// A zero value.
    pub const ZERO: f64 = 0.0;

    pub fn new(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
    pub const fn maximum() -> Self {
        Self(Self::MAX)
    }
    pub const fn minimum() -> Self {
        Self(Self::MIN)
    }
    pub const fn zero() -> Self {
        Self(Self::ZERO)
    }

    /// Whether the raw value lies within this type's range.
    pub fn contains(value: f64) -> bool {
        (Self::MIN..=Self::MAX).contains(&value)
    }

    /// Linear interpolation between `self` (at 0.0) and `other` (at 1.0).
    pub fn lerp(&self, other: Self, fraction: f64) -> f64 {
        self.0 + (other.0 - self.0) * fraction
    }
}
impl<const LOWER: i8, const UPPER: i8> Display for RangedF64<LOWER, UPPER> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{}", self.0))
    }
}
impl<const LOWER: i8, const UPPER: i8> Add for RangedF64<LOWER, UPPER> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}
impl<const LOWER: i8, const UPPER: i8> Sub for RangedF64<LOWER, UPPER> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<RangedF64<LOWER, UPPER>> for f64 {
    fn from(value: RangedF64<LOWER, UPPER>) -> Self {
        value
            .0
            .clamp(RangedF64::<LOWER, UPPER>::MIN, RangedF64::<LOWER, UPPER>::MAX)
    }
}
impl<const LOWER: i8, const UPPER: i8> From<f64> for RangedF64<LOWER, UPPER> {
    fn from(value: f64) -> Self {
        Self(value.clamp(Self::MIN, Self::MAX))
    }
}

/// A [BipolarNormal] is a RangedF64 whose range is [-1.0, 1.0]. Partial
/// amplitudes are [BipolarNormal]s; negative values invert the phase.
pub type BipolarNormal = RangedF64<-1, 1>;
#[allow(missing_docs)]
impl BipolarNormal {
    pub const fn range() -> RangeInclusive<f64> {
        -1.0..=1.0
    }
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }
}
impl Default for BipolarNormal {
    fn default() -> Self {
        Self(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bipolar_normal_mainline() {
        let a = BipolarNormal::new(0.2);
        let b = BipolarNormal::new(-0.1);

        assert_eq!(a + b, BipolarNormal::new(0.2 + -0.1), "Addition should work.");
        assert_eq!(a - b, BipolarNormal::new(0.2 - -0.1), "Subtraction should work.");
        assert_eq!(BipolarNormal::default(), BipolarNormal::zero());
    }

    #[test]
    fn bipolar_normal_out_of_bounds() {
        assert_eq!(
            BipolarNormal::new(-1.5),
            BipolarNormal::minimum(),
            "BipolarNormal below -1.0 should be clamped to -1.0"
        );
        assert_eq!(
            BipolarNormal::from(1.1),
            BipolarNormal::maximum(),
            "BipolarNormal above 1.0 should be clamped to 1.0"
        );
        assert!(BipolarNormal::contains(-1.0));
        assert!(!BipolarNormal::contains(1.0001));
    }

    #[test]
    fn interpolation() {
        let a = BipolarNormal::new(-0.5);
        let b = BipolarNormal::new(0.5);
        assert_eq!(a.lerp(b, 0.0), -0.5);
        assert_eq!(a.lerp(b, 0.5), 0.0);
        assert_eq!(a.lerp(b, 1.0), 0.5);
    }
}
