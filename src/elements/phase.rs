// Copyright (c) 2024 Mike Tsao

//! Closed-form phase arithmetic shared by the envelope mapper and the paxel
//! oscillator. Both must agree exactly on where a paxel's phase ends, so this
//! math lives in exactly one place.
//!
//! All phases are in radians. Wrapped phases lie in [0, 2π).

use crate::prelude::*;
use core::f64::consts::{PI, TAU};

/// One full cycle, in radians.
pub const TWO_PI: f64 = TAU;

/// Reduces any finite phase to [0, 2π).
pub fn wrap_phase(phase: f64) -> f64 {
    let wrapped = phase.rem_euclid(TWO_PI);
    // rem_euclid() can round up to exactly 2π for tiny negative inputs.
    if wrapped >= TWO_PI {
        0.0
    } else {
        wrapped
    }
}

/// The unwrapped phase advance, in radians, of a sinusoid whose frequency moves
/// linearly from `start_frequency` to `end_frequency` over `duration_samples`.
/// This is the integral of the instantaneous frequency, which for a linear ramp
/// is the mean frequency times the duration.
pub fn phase_advance(
    start_frequency: FrequencyHz,
    end_frequency: FrequencyHz,
    duration_samples: u32,
    sample_rate: SampleRate,
) -> f64 {
    let mean_frequency = (start_frequency.0 + end_frequency.0) / 2.0;
    TWO_PI * mean_frequency * duration_samples as f64 / sample_rate.0 as f64
}

/// The "natural" phase at the end of a paxel: where the phase ends up if it
/// simply keeps cycling from `start_phase`, wrapped to [0, 2π).
pub fn natural_phase(
    start_phase: f64,
    start_frequency: FrequencyHz,
    end_frequency: FrequencyHz,
    duration_samples: u32,
    sample_rate: SampleRate,
) -> f64 {
    wrap_phase(
        start_phase
            + phase_advance(
                start_frequency,
                end_frequency,
                duration_samples,
                sample_rate,
            ),
    )
}

/// The smallest value in [-π, π] that, added to `source_phase`, lands on
/// `target_phase` modulo 2π. Either input may be outside [0, 2π).
pub fn coherence_compensation(source_phase: f64, target_phase: f64) -> f64 {
    if source_phase == target_phase {
        return 0.0;
    }
    let mut difference = wrap_phase(target_phase) - wrap_phase(source_phase);
    if difference > PI {
        difference -= TWO_PI;
    } else if difference < -PI {
        difference += TWO_PI;
    }
    difference
}
