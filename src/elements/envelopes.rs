// Copyright (c) 2024 Mike Tsao

use super::phase::TWO_PI;
use crate::prelude::*;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// A single breakpoint in a [BreakpointEnvelope].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EnvelopePoint {
    /// The sample offset at which the envelope has the given value.
    pub(crate) when: u32,
    /// The envelope's value at that offset.
    pub(crate) value: f64,
}
impl EnvelopePoint {
    #[allow(missing_docs)]
    pub fn new(when: u32, value: f64) -> Self {
        Self { when, value }
    }
}
impl From<(u32, f64)> for EnvelopePoint {
    fn from(value: (u32, f64)) -> Self {
        Self::new(value.0, value.1)
    }
}

/// A piecewise-linear envelope. The value moves in a straight line from each
/// point to the next, and holds level before the first point and after the
/// last one. Two consecutive points at the same sample make a step.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct BreakpointEnvelope {
    /// The breakpoints, in time order.
    #[builder(default, setter(each(name = "point", into)))]
    points: Vec<EnvelopePoint>,
}
impl BreakpointEnvelopeBuilder {
    /// Builds the [BreakpointEnvelope]. There must be at least one point, all
    /// values must be finite, and points must be in ascending time order.
    pub fn build(&self) -> Result<BreakpointEnvelope, BreakpointEnvelopeBuilderError> {
        let envelope = self.build_from_builder()?;
        Self::verify_points(&envelope)?;
        Ok(envelope)
    }

    /// Consecutive points with the same time are OK, but they can't go back in
    /// time.
    fn verify_points(envelope: &BreakpointEnvelope) -> Result<(), BreakpointEnvelopeBuilderError> {
        if envelope.points.is_empty() {
            return Err(BreakpointEnvelopeBuilderError::ValidationError(
                "An envelope needs at least one point".to_string(),
            ));
        }
        let mut last_when = 0;
        for p in envelope.points.iter() {
            if p.when < last_when {
                return Err(BreakpointEnvelopeBuilderError::ValidationError(
                    "Point's time field is out of order".to_string(),
                ));
            }
            if !p.value.is_finite() {
                return Err(BreakpointEnvelopeBuilderError::ValidationError(format!(
                    "Point at {} has a non-finite value",
                    p.when
                )));
            }
            last_when = p.when;
        }
        Ok(())
    }
}
impl BreakpointEnvelope {
    /// An envelope that never changes.
    pub fn constant(value: f64) -> Self {
        Self {
            points: vec![EnvelopePoint::new(0, value)],
        }
    }

    /// Creates an envelope the way SuperCollider's `Env` describes one: a list
    /// of levels, and a list of durations in seconds for each transition
    /// between consecutive levels. Extra durations are ignored. A single level
    /// with no durations is a constant.
    pub fn from_levels_and_times(
        levels: &[f64],
        times: &[Seconds],
        sample_rate: SampleRate,
    ) -> Result<Self, BreakpointEnvelopeBuilderError> {
        if levels.len() > times.len() + 1 {
            return Err(BreakpointEnvelopeBuilderError::ValidationError(format!(
                "{} levels need at least {} times, but got {}",
                levels.len(),
                levels.len() - 1,
                times.len()
            )));
        }
        if let Some(t) = times.iter().find(|t| !(t.0 >= 0.0)) {
            return Err(BreakpointEnvelopeBuilderError::ValidationError(format!(
                "segment time {} must not be negative",
                t.0
            )));
        }

        let mut builder = BreakpointEnvelopeBuilder::default();
        let mut when = 0u32;
        for (i, level) in levels.iter().enumerate() {
            if i > 0 {
                when = when
                    .checked_add(sample_rate.samples_in(times[i - 1]))
                    .ok_or_else(|| {
                        BreakpointEnvelopeBuilderError::ValidationError(
                            "envelope is too long".to_string(),
                        )
                    })?;
            }
            builder.point((when, *level));
        }
        builder.build()
    }

    /// The breakpoints, in time order.
    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    /// The sample offset of the last breakpoint.
    pub fn last_when(&self) -> u32 {
        self.points.last().map_or(0, |p| p.when)
    }

    /// The envelope's value at the given sample offset.
    pub fn value_at(&self, sample: u32) -> f64 {
        let next = self.points.partition_point(|p| p.when <= sample);
        if next == 0 {
            self.points.first().map_or(0.0, |p| p.value)
        } else if next == self.points.len() {
            self.points[next - 1].value
        } else {
            let (a, b) = (&self.points[next - 1], &self.points[next]);
            let fraction = (sample - a.when) as f64 / (b.when - a.when) as f64;
            a.value + (b.value - a.value) * fraction
        }
    }
}

/// A place in a partial where its phase is pinned down. Every target also
/// becomes a paxel boundary.
///
/// A *controlled* target says the partial must reach exactly `phase` radians
/// at sample offset `when`. The difference from where the phase would
/// naturally have got to is spread over the paxels since the previous target,
/// in proportion to their lengths, so no single paxel has to bend much.
///
/// A *natural* target asks for no particular phase. It marks where the phase
/// stops being free-running, so that the next controlled target's correction
/// is spread only over the paxels after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PhaseTarget {
    when: u32,
    phase: Option<f64>,
}
impl PhaseTarget {
    /// The partial must be at `phase` radians, in [0, 2π), at sample offset
    /// `when`.
    pub fn controlled(when: u32, phase: f64) -> Self {
        Self {
            when,
            phase: Some(phase),
        }
    }

    /// The partial keeps whatever phase it naturally has at `when`.
    pub fn natural(when: u32) -> Self {
        Self { when, phase: None }
    }

    /// The sample offset, relative to the start of the envelopes.
    pub fn when(&self) -> u32 {
        self.when
    }

    /// The required phase, or [None] for a natural target.
    pub fn phase(&self) -> Option<f64> {
        self.phase
    }

    /// Targets must come after the start of the partial but no later than its
    /// end, in strictly ascending time order, and controlled phases must be in
    /// [0, 2π).
    pub fn verify_targets(targets: &[PhaseTarget], duration_samples: u32) -> Result<(), String> {
        let mut last_when = 0;
        for target in targets {
            if target.when <= last_when {
                return Err(format!(
                    "phase target at {} must come after {}",
                    target.when, last_when
                ));
            }
            if target.when > duration_samples {
                return Err(format!(
                    "phase target at {} is past the end of the partial at {}",
                    target.when, duration_samples
                ));
            }
            if let Some(phase) = target.phase {
                if !(0.0..TWO_PI).contains(&phase) {
                    return Err(format!(
                        "phase target at {} wants {}, which is outside [0, 2π)",
                        target.when, phase
                    ));
                }
            }
            last_when = target.when;
        }
        Ok(())
    }
}

/// The continuous description of one partial, in terms of a frequency
/// envelope, an amplitude envelope, a starting phase, and optionally some
/// [PhaseTarget]s along the way. This is the stock [ShapesPartial].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "kebab-case")]
#[builder(build_fn(private, name = "build_from_builder"))]
pub struct PartialEnvelopes {
    /// Hz. Every level must be positive.
    frequency: BreakpointEnvelope,
    /// Every level must be in [-1.0, 1.0]. Negative levels invert phase.
    amplitude: BreakpointEnvelope,
    /// How long the partial lasts.
    duration_samples: u32,
    /// Radians, in [0, 2π).
    #[builder(default)]
    initial_phase: f64,
    /// In ascending time order.
    #[builder(default, setter(each(name = "phase_target")))]
    #[serde(default)]
    phase_targets: Vec<PhaseTarget>,
    /// The sample rate that the envelopes' sample offsets are expressed in.
    #[builder(default)]
    sample_rate: SampleRate,
}
impl PartialEnvelopesBuilder {
    /// Builds the [PartialEnvelopes], checking that frequencies stay positive,
    /// amplitudes stay in range, the initial phase is in [0, 2π), and the
    /// partial lasts at least one sample. Phase targets are checked with
    /// [PhaseTarget::verify_targets()].
    pub fn build(&self) -> Result<PartialEnvelopes, PartialEnvelopesBuilderError> {
        let envelopes = self.build_from_builder()?;
        let invalid = |msg: String| Err(PartialEnvelopesBuilderError::ValidationError(msg));

        if envelopes.duration_samples == 0 {
            return invalid("A partial must last at least one sample".to_string());
        }
        if let Some(p) = envelopes
            .frequency
            .points()
            .iter()
            .find(|p| !FrequencyHz(p.value).is_valid())
        {
            return invalid(format!("frequency level {} must be positive", p.value));
        }
        if let Some(p) = envelopes
            .amplitude
            .points()
            .iter()
            .find(|p| !BipolarNormal::contains(p.value))
        {
            return invalid(format!(
                "amplitude level {} is outside [-1.0, 1.0]",
                p.value
            ));
        }
        if !(0.0..TWO_PI).contains(&envelopes.initial_phase) {
            return invalid(format!(
                "initial phase {} is outside [0, 2π)",
                envelopes.initial_phase
            ));
        }
        if let Err(msg) =
            PhaseTarget::verify_targets(&envelopes.phase_targets, envelopes.duration_samples)
        {
            return invalid(msg);
        }
        Ok(envelopes)
    }

    /// Sets the duration to the end of whichever envelope, or phase target,
    /// ends last. Call this after setting everything else.
    pub fn duration_from_envelopes(&mut self) -> &mut Self {
        let last_target = self
            .phase_targets
            .iter()
            .flatten()
            .map(PhaseTarget::when)
            .max();
        let last = [&self.frequency, &self.amplitude]
            .into_iter()
            .flatten()
            .map(BreakpointEnvelope::last_when)
            .chain(last_target)
            .max()
            .unwrap_or_default();
        self.duration_samples(last)
    }
}
#[allow(missing_docs)]
impl PartialEnvelopes {
    pub fn frequency(&self) -> &BreakpointEnvelope {
        &self.frequency
    }
    pub fn amplitude(&self) -> &BreakpointEnvelope {
        &self.amplitude
    }
}
impl ShapesPartial for PartialEnvelopes {
    fn duration_samples(&self) -> u32 {
        self.duration_samples
    }

    fn frequency_at(&self, sample: u32) -> FrequencyHz {
        FrequencyHz(self.frequency.value_at(sample))
    }

    fn amplitude_at(&self, sample: u32) -> BipolarNormal {
        BipolarNormal::new(self.amplitude.value_at(sample))
    }

    fn initial_phase(&self) -> f64 {
        self.initial_phase
    }

    fn phase_targets(&self) -> &[PhaseTarget] {
        &self.phase_targets
    }

    fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn envelope(points: &[(u32, f64)]) -> BreakpointEnvelope {
        let mut b = BreakpointEnvelopeBuilder::default();
        points.iter().for_each(|p| {
            b.point(*p);
        });
        b.build().unwrap()
    }

    #[test]
    fn breakpoint_interpolation() {
        let e = envelope(&[(10, 1.0), (20, 3.0), (20, 5.0), (40, 1.0)]);
        assert_eq!(e.value_at(0), 1.0, "holds before the first point");
        assert_eq!(e.value_at(10), 1.0);
        assert_eq!(e.value_at(15), 2.0);
        assert_eq!(e.value_at(20), 5.0, "a repeated time is a step");
        assert_eq!(e.value_at(30), 3.0);
        assert_eq!(e.value_at(40), 1.0);
        assert_eq!(e.value_at(u32::MAX), 1.0, "holds after the last point");
        assert_eq!(e.last_when(), 40);

        let c = BreakpointEnvelope::constant(0.25);
        assert_eq!(c.value_at(0), 0.25);
        assert_eq!(c.value_at(1_000_000), 0.25);
    }

    #[test]
    fn points_can_be_added_one_at_a_time() {
        let mut b = BreakpointEnvelopeBuilder::default();
        b.point((0, 1.0)).point(EnvelopePoint::new(10, 2.0));
        let e = b.build().unwrap();
        assert_eq!(
            e.points(),
            &[EnvelopePoint::new(0, 1.0), EnvelopePoint::new(10, 2.0)]
        );
        assert_eq!(e.value_at(5), 1.5);
    }

    #[test]
    fn breakpoint_builder_validation() {
        assert!(BreakpointEnvelopeBuilder::default().build().is_err());
        let mut b = BreakpointEnvelopeBuilder::default();
        b.point((10, 1.0)).point((5, 1.0));
        assert!(b.build().is_err(), "out of order");
        let mut b = BreakpointEnvelopeBuilder::default();
        b.point((0, f64::NAN));
        assert!(b.build().is_err(), "NaN");
    }

    #[test]
    fn levels_and_times() {
        let sr = SampleRate::new(1000);
        let e = BreakpointEnvelope::from_levels_and_times(
            &[100.0, 200.0, 50.0],
            &[Seconds(0.5), Seconds(0.25), Seconds(99.0)],
            sr,
        )
        .unwrap();
        assert_eq!(
            e.points(),
            &[
                EnvelopePoint::new(0, 100.0),
                EnvelopePoint::new(500, 200.0),
                EnvelopePoint::new(750, 50.0)
            ],
            "times are relative, and extras are ignored"
        );
        assert!(approx_eq!(f64, e.value_at(250), 150.0, ulps = 2));

        let single = BreakpointEnvelope::from_levels_and_times(&[0.5], &[], sr).unwrap();
        assert_eq!(single, BreakpointEnvelope::constant(0.5));

        assert!(BreakpointEnvelope::from_levels_and_times(&[], &[], sr).is_err());
        assert!(
            BreakpointEnvelope::from_levels_and_times(&[1.0, 2.0, 3.0], &[Seconds(1.0)], sr)
                .is_err()
        );
        assert!(
            BreakpointEnvelope::from_levels_and_times(&[1.0, 2.0], &[Seconds(-1.0)], sr).is_err()
        );
    }

    #[test]
    fn partial_envelopes_mainline() {
        let e = PartialEnvelopesBuilder::default()
            .frequency(envelope(&[(0, 440.0), (1000, 880.0)]))
            .amplitude(envelope(&[(0, 0.0), (100, 1.0), (1200, 0.0)]))
            .initial_phase(1.0)
            .sample_rate(SampleRate::new(44100))
            .duration_from_envelopes()
            .build()
            .unwrap();
        assert_eq!(e.duration_samples(), 1200);
        assert_eq!(e.frequency_at(500), FrequencyHz(660.0));
        assert_eq!(e.frequency_at(1200), FrequencyHz(880.0));
        assert_eq!(e.amplitude_at(100), BipolarNormal::maximum());
        assert_eq!(e.initial_phase(), 1.0);
        assert_eq!(e.sample_rate(), SampleRate::new(44100));
    }

    #[test]
    fn partial_envelopes_defaults_and_validation() {
        let e = PartialEnvelopesBuilder::default()
            .frequency(BreakpointEnvelope::constant(100.0))
            .amplitude(BreakpointEnvelope::constant(0.5))
            .duration_samples(10)
            .build()
            .unwrap();
        assert_eq!(e.initial_phase(), 0.0);
        assert_eq!(e.sample_rate(), SampleRate::DEFAULT);

        let try_build = |frequency: f64, amplitude: f64, duration: u32, phase: f64| {
            PartialEnvelopesBuilder::default()
                .frequency(BreakpointEnvelope::constant(frequency))
                .amplitude(BreakpointEnvelope::constant(amplitude))
                .duration_samples(duration)
                .initial_phase(phase)
                .build()
        };
        assert!(try_build(100.0, -1.0, 10, 0.0).is_ok());
        assert!(try_build(0.0, 0.5, 10, 0.0).is_err());
        assert!(try_build(100.0, 1.01, 10, 0.0).is_err());
        assert!(try_build(100.0, 0.5, 0, 0.0).is_err());
        assert!(try_build(100.0, 0.5, 10, TWO_PI).is_err());
        assert!(matches!(
            PartialEnvelopesBuilder::default().duration_samples(10).build(),
            Err(PartialEnvelopesBuilderError::UninitializedField("frequency"))
        ));
    }

    #[test]
    fn phase_targets() {
        let e = PartialEnvelopesBuilder::default()
            .frequency(BreakpointEnvelope::constant(100.0))
            .amplitude(envelope(&[(0, 0.0), (500, 1.0)]))
            .phase_target(PhaseTarget::controlled(100, 1.5))
            .phase_target(PhaseTarget::natural(200))
            .phase_target(PhaseTarget::controlled(800, 0.0))
            .duration_from_envelopes()
            .build()
            .unwrap();
        assert_eq!(e.duration_samples(), 800, "the last target stretches the partial");
        assert_eq!(
            e.phase_targets()
                .iter()
                .map(|t| (t.when(), t.phase()))
                .collect::<Vec<_>>(),
            vec![(100, Some(1.5)), (200, None), (800, Some(0.0))]
        );

        let try_build = |targets: &[PhaseTarget]| {
            PartialEnvelopesBuilder::default()
                .frequency(BreakpointEnvelope::constant(100.0))
                .amplitude(BreakpointEnvelope::constant(0.5))
                .duration_samples(1000)
                .phase_targets(targets.to_vec())
                .build()
        };
        assert!(try_build(&[]).is_ok());
        assert!(try_build(&[PhaseTarget::natural(1000)]).is_ok());
        assert!(try_build(&[PhaseTarget::controlled(0, 1.0)]).is_err(), "at the start");
        assert!(try_build(&[PhaseTarget::natural(1001)]).is_err(), "past the end");
        assert!(
            try_build(&[PhaseTarget::natural(10), PhaseTarget::natural(10)]).is_err(),
            "same time twice"
        );
        assert!(
            try_build(&[PhaseTarget::natural(20), PhaseTarget::natural(10)]).is_err(),
            "out of order"
        );
        assert!(try_build(&[PhaseTarget::controlled(10, TWO_PI)]).is_err());
        assert!(try_build(&[PhaseTarget::controlled(10, f64::NAN)]).is_err());
    }
}
