// Copyright (c) 2024 Mike Tsao

//! The traits that define the boundaries between the partial-synthesis core
//! and its collaborators.

use crate::{prelude::*, specification::PaxelSpecification};

/// Quick import of all important traits.
pub mod prelude {
    pub use super::{RendersPaxel, ShapesPartial};
}

/// A [ShapesPartial] describes, continuously over the whole lifetime of a
/// partial, how its frequency and amplitude evolve.
///
/// Implementations must answer queries at every sample offset in
/// `0..=duration_samples()`. The closing offset is needed because the last
/// segment's end values are read there.
pub trait ShapesPartial {
    /// The intended length of the partial, in samples.
    fn duration_samples(&self) -> u32;

    /// The instantaneous frequency at the given sample offset.
    fn frequency_at(&self, sample: u32) -> FrequencyHz;

    /// The instantaneous amplitude at the given sample offset.
    fn amplitude_at(&self, sample: u32) -> BipolarNormal;

    /// The phase, in radians in [0, 2π), at which the partial starts.
    fn initial_phase(&self) -> f64 {
        0.0
    }

    /// Places after the start where the phase is pinned down, in ascending
    /// time order. See [PhaseTarget].
    fn phase_targets(&self) -> &[PhaseTarget] {
        &[]
    }

    /// The sample rate that the sample offsets are expressed in.
    fn sample_rate(&self) -> SampleRate {
        SampleRate::DEFAULT
    }
}

/// A [RendersPaxel] turns one fully specified paxel into raw samples. This is
/// the per-segment oscillator that a [PartialGenerator](crate::PartialGenerator)
/// delegates to.
///
/// The contract is strict, because continuity across paxel boundaries depends
/// on it:
///
/// * The returned vector holds exactly `paxel.duration_samples` samples.
/// * Phase follows the integral of the linearly interpolated frequency, so that
///   the phase reached at the end of the paxel is its `end_phase`.
/// * Amplitude is linearly interpolated from `start_amplitude` to
///   `end_amplitude`.
/// * Output depends only on the arguments. This is what makes it safe to
///   render paxels of one partial in any order, on any thread.
pub trait RendersPaxel: Send + Sync + core::fmt::Debug {
    /// Synthesizes the samples for one paxel.
    fn render_paxel(&self, paxel: &PaxelSpecification, sample_rate: SampleRate) -> Vec<Sample>;
}
