// Copyright (c) 2024 Mike Tsao

use super::phase::{self, TWO_PI};
use crate::{prelude::*, specification::PaxelSpecification};
use kahan::KahanSum;

/// The stock [RendersPaxel]. Produces a sine whose frequency and amplitude
/// ramp linearly across the paxel.
///
/// The phase trajectory is the integral of the instantaneous frequency. Sample
/// `k` is evaluated at the start of sample `k`, so the first sample sits
/// exactly on `start_phase`, and the phase at `k = duration_samples` (which is
/// sample zero of the next paxel) is `end_phase`.
///
/// If a paxel's `end_phase` isn't where the phase would naturally land, the
/// difference is folded into the frequency ramp by nudging the end frequency.
/// The nudge always takes the short way around the circle, so it's never more
/// than half a cycle over the whole paxel.
#[derive(Clone, Copy, Debug, Default)]
pub struct PaxelOscillator {}
impl RendersPaxel for PaxelOscillator {
    fn render_paxel(&self, paxel: &PaxelSpecification, sample_rate: SampleRate) -> Vec<Sample> {
        let duration = paxel.duration_samples();
        let sample_rate_f64 = sample_rate.0 as f64;
        let start_frequency = paxel.start_frequency().0;
        let end_frequency = Self::compensated_end_frequency(paxel, sample_rate).0;
        let frequency_slope = (end_frequency - start_frequency) / duration as f64;

        // Track phase in cycles rather than radians. It needs Kahan summation
        // so that long paxels end where the closed-form math says they do.
        let mut cycle_position = KahanSum::new_with_value(paxel.start_phase() / TWO_PI);

        let mut samples = Vec::with_capacity(duration as usize);
        for k in 0..duration {
            let fraction = k as f64 / duration as f64;
            let amplitude = paxel.start_amplitude().lerp(paxel.end_amplitude(), fraction);
            let radians = TWO_PI * cycle_position.sum();
            samples.push(Sample::from_signal(amplitude * radians.sin()));

            // Exact integral of a linear ramp over one sample: the mean of the
            // frequencies at either edge.
            let here = start_frequency + frequency_slope * k as f64;
            let there = here + frequency_slope;
            cycle_position += (here + there) / 2.0 / sample_rate_f64;
            let whole_cycles = cycle_position.sum().floor();
            if whole_cycles != 0.0 {
                cycle_position += -whole_cycles;
            }
        }
        samples
    }
}
impl PaxelOscillator {
    /// The end frequency this oscillator actually ramps toward, after folding
    /// in any difference between the paxel's natural and declared end phases.
    pub fn compensated_end_frequency(
        paxel: &PaxelSpecification,
        sample_rate: SampleRate,
    ) -> FrequencyHz {
        let compensation = phase::coherence_compensation(
            paxel.natural_end_phase(sample_rate),
            paxel.end_phase(),
        );
        if compensation == 0.0 {
            return paxel.end_frequency();
        }
        let frequency_change = 2.0 * compensation * sample_rate.0 as f64
            / (TWO_PI * paxel.duration_samples() as f64);
        paxel.end_frequency() + FrequencyHz(frequency_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::specification::PaxelSpecificationBuilder;
    use float_cmp::approx_eq;
    use more_asserts::{assert_gt, assert_le};

    const SR: SampleRate = SampleRate::new(48000);

    fn natural_paxel(
        start_sample: u32,
        duration: u32,
        frequencies: (f64, f64),
        amplitudes: (f64, f64),
        start_phase: f64,
    ) -> PaxelSpecification {
        let end_phase = phase::natural_phase(
            start_phase,
            frequencies.0.into(),
            frequencies.1.into(),
            duration,
            SR,
        );
        PaxelSpecificationBuilder::default()
            .start_frequency(frequencies.0)
            .end_frequency(frequencies.1)
            .start_amplitude(amplitudes.0)
            .end_amplitude(amplitudes.1)
            .start_phase(start_phase)
            .end_phase(end_phase)
            .layout(start_sample, duration)
            .build()
            .unwrap()
    }

    #[test]
    fn renders_exactly_the_requested_length() {
        let o = PaxelOscillator::default();
        for duration in [1, 2, 255, 4096] {
            let p = natural_paxel(0, duration, (440.0, 660.0), (0.5, 0.5), 0.0);
            assert_eq!(o.render_paxel(&p, SR).len(), duration as usize);
        }
    }

    #[test]
    fn first_sample_sits_on_the_start_phase() {
        let o = PaxelOscillator::default();
        let p = natural_paxel(0, 16, (1000.0, 1000.0), (1.0, 0.0), TWO_PI / 4.0);
        let samples = o.render_paxel(&p, SR);
        assert_eq!(samples[0], Sample::MAX, "sin(π/2) at full amplitude");

        let p = natural_paxel(0, 16, (1000.0, 1000.0), (1.0, 1.0), 0.0);
        assert_eq!(o.render_paxel(&p, SR)[0], Sample::SILENCE);
    }

    #[test]
    fn silent_and_inverted_paxels() {
        let o = PaxelOscillator::default();
        let silent = natural_paxel(0, 100, (300.0, 500.0), (0.0, 0.0), 1.0);
        assert!(o
            .render_paxel(&silent, SR)
            .iter()
            .all(|s| *s == Sample::SILENCE));

        let upright = o.render_paxel(&natural_paxel(0, 100, (300.0, 500.0), (0.7, 0.2), 1.0), SR);
        let inverted =
            o.render_paxel(&natural_paxel(0, 100, (300.0, 500.0), (-0.7, -0.2), 1.0), SR);
        assert!(upright.iter().any(|s| s.0 != 0));
        for (u, i) in upright.iter().zip(inverted.iter()) {
            assert_eq!(u.0, -i.0);
        }
    }

    #[test]
    fn split_paxels_match_one_long_paxel() {
        let o = PaxelOscillator::default();
        let whole = o.render_paxel(&natural_paxel(0, 2000, (440.0, 440.0), (0.8, 0.8), 0.3), SR);

        let first = natural_paxel(0, 1000, (440.0, 440.0), (0.8, 0.8), 0.3);
        let second = natural_paxel(1000, 1000, (440.0, 440.0), (0.8, 0.8), first.end_phase());
        let mut split = o.render_paxel(&first, SR);
        split.extend(o.render_paxel(&second, SR));

        assert_eq!(whole.len(), split.len());
        for (a, b) in whole.iter().zip(split.iter()) {
            assert_le!((a.0 - b.0).abs(), 2, "the split shouldn't be audible");
        }
    }

    #[test]
    fn natural_paxels_need_no_compensation() {
        let p = natural_paxel(0, 777, (200.0, 2000.0), (0.1, 0.9), 2.0);
        let compensated = PaxelOscillator::compensated_end_frequency(&p, SR);
        assert!(approx_eq!(f64, compensated.0, 2000.0, epsilon = 1e-6));
    }

    #[test]
    fn compensation_lands_on_the_declared_end_phase() {
        let duration = 500;
        let natural = phase::natural_phase(0.0, 440.0.into(), 440.0.into(), duration, SR);
        let declared = phase::wrap_phase(natural + 1.0);
        let p = PaxelSpecificationBuilder::default()
            .start_frequency(440.0)
            .end_frequency(440.0)
            .start_amplitude(0.5)
            .end_amplitude(0.5)
            .start_phase(0.0)
            .end_phase(declared)
            .layout(0, duration)
            .build()
            .unwrap();

        let compensated = PaxelOscillator::compensated_end_frequency(&p, SR);
        assert_gt!(compensated.0, 440.0, "catching up means speeding up");
        let reached = phase::natural_phase(0.0, 440.0.into(), compensated, duration, SR);
        assert!(approx_eq!(
            f64,
            phase::coherence_compensation(reached, declared),
            0.0,
            epsilon = 1e-9
        ));
    }

    #[test]
    fn output_is_deterministic() {
        let o = PaxelOscillator::default();
        let p = natural_paxel(4096, 4096, (55.0, 7040.0), (-1.0, 1.0), 5.0);
        assert_eq!(o.render_paxel(&p, SR), o.render_paxel(&p, SR));
    }
}
