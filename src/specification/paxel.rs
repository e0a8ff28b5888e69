// Copyright (c) 2024 Mike Tsao

use crate::{elements::phase, prelude::*};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A [PaxelSpecification] fully describes one segment ("paxel") of a partial:
/// a sinusoid whose frequency and amplitude move linearly from their start to
/// their end values, starting and ending at the given phases.
///
/// Paxels are produced by [PaxelSpecificationBuilder] and are immutable once
/// built. The builder refuses to produce a paxel unless every field was set
/// and the values are consistent.
#[derive(Clone, Debug, PartialEq, Builder, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[builder(
    build_fn(private, name = "build_from_builder"),
    derive(Debug, PartialEq)
)]
pub struct PaxelSpecification {
    /// Frequency at the first sample.
    #[builder(setter(into))]
    start_frequency: FrequencyHz,
    /// Frequency the paxel is heading toward at its closing boundary.
    #[builder(setter(into))]
    end_frequency: FrequencyHz,
    /// Amplitude at the first sample. Negative inverts phase.
    #[builder(setter(into))]
    start_amplitude: BipolarNormal,
    /// Amplitude at the closing boundary.
    #[builder(setter(into))]
    end_amplitude: BipolarNormal,
    /// Phase, in radians, at the first sample.
    start_phase: f64,
    /// Phase, in radians, at the closing boundary.
    end_phase: f64,
    /// Length in samples. Must be positive.
    duration_samples: u32,
    /// Absolute position of the first sample within the partial.
    start_sample: u32,
    /// Absolute position of the last sample within the partial.
    end_sample: u32,
}
#[allow(missing_docs)]
impl PaxelSpecification {
    pub fn start_frequency(&self) -> FrequencyHz {
        self.start_frequency
    }
    pub fn end_frequency(&self) -> FrequencyHz {
        self.end_frequency
    }
    pub fn start_amplitude(&self) -> BipolarNormal {
        self.start_amplitude
    }
    pub fn end_amplitude(&self) -> BipolarNormal {
        self.end_amplitude
    }
    pub fn start_phase(&self) -> f64 {
        self.start_phase
    }
    pub fn end_phase(&self) -> f64 {
        self.end_phase
    }
    pub fn duration_samples(&self) -> u32 {
        self.duration_samples
    }
    pub fn start_sample(&self) -> u32 {
        self.start_sample
    }
    pub fn end_sample(&self) -> u32 {
        self.end_sample
    }

    /// The phase this paxel would reach at its closing boundary if nothing
    /// nudged it toward `end_phase`.
    pub fn natural_end_phase(&self, sample_rate: SampleRate) -> f64 {
        phase::natural_phase(
            self.start_phase,
            self.start_frequency,
            self.end_frequency,
            self.duration_samples,
            sample_rate,
        )
    }

    /// Checks the invariants that [PaxelSpecificationBuilder::build()]
    /// enforces. Useful for paxels that arrived by some other route, such as
    /// deserialization.
    pub fn validate(&self) -> Result<(), String> {
        if self.duration_samples == 0 {
            return Err("duration must be at least one sample".to_string());
        }
        match self.start_sample.checked_add(self.duration_samples - 1) {
            Some(end) if end == self.end_sample => {}
            Some(end) => {
                return Err(format!(
                    "end sample {} should be {} (start {} + duration {} - 1)",
                    self.end_sample, end, self.start_sample, self.duration_samples
                ))
            }
            None => return Err("paxel extends past the last addressable sample".to_string()),
        }
        for (name, frequency) in [
            ("start frequency", self.start_frequency),
            ("end frequency", self.end_frequency),
        ] {
            if !frequency.is_valid() {
                return Err(format!("{name} {} must be positive", frequency.0));
            }
        }
        for (name, amplitude) in [
            ("start amplitude", self.start_amplitude),
            ("end amplitude", self.end_amplitude),
        ] {
            if !BipolarNormal::contains(amplitude.0) {
                return Err(format!("{name} {} is outside [-1.0, 1.0]", amplitude.0));
            }
        }
        for (name, value) in [("start phase", self.start_phase), ("end phase", self.end_phase)] {
            if !(value.is_finite() && (0.0..phase::TWO_PI).contains(&value)) {
                return Err(format!("{name} {value} is outside [0, 2π)"));
            }
        }
        Ok(())
    }
}

impl PaxelSpecificationBuilder {
    /// Builds the [PaxelSpecification]. Fails with
    /// [PaxelSpecificationBuilderError::UninitializedField] if anything was
    /// never set, and with [PaxelSpecificationBuilderError::ValidationError] if
    /// the values don't describe a valid paxel.
    pub fn build(&self) -> Result<PaxelSpecification, PaxelSpecificationBuilderError> {
        let paxel = self.build_from_builder()?;
        paxel
            .validate()
            .map_err(PaxelSpecificationBuilderError::ValidationError)?;
        Ok(paxel)
    }

    /// Sets where the paxel sits in the partial. The end sample is derived
    /// from the other two, so the three can't disagree.
    pub fn layout(&mut self, start_sample: u32, duration_samples: u32) -> &mut Self {
        self.start_sample(start_sample)
            .duration_samples(duration_samples)
            .end_sample(
                start_sample
                    .saturating_add(duration_samples)
                    .saturating_sub(1),
            )
    }

    /// How far the phase of what's been staged so far would advance, or
    /// [None] if the duration or frequencies aren't known yet.
    pub(crate) fn staged_phase_advance(&self, sample_rate: SampleRate) -> Option<f64> {
        Some(phase::phase_advance(
            self.start_frequency?,
            self.end_frequency?,
            self.duration_samples?,
            sample_rate,
        ))
    }
}
