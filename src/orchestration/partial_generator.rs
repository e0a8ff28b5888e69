// Copyright (c) 2024 Mike Tsao

use crate::{
    elements::PaxelOscillator,
    mapping::EnvelopeMapper,
    prelude::*,
    specification::{PartialSpecification, PaxelSpecification},
};
use anyhow::anyhow;
use log::debug;
use serde::{Deserialize, Serialize};

/// A [PartialGenerator] owns everything needed to render one partial: its
/// frozen [PartialSpecification] and the [Labels] that downstream code uses to
/// classify it. Rendering never changes either, so the same generator always
/// produces the same audio.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialGenerator {
    specification: PartialSpecification,
    labels: Labels,
}
impl PartialGenerator {
    /// Wraps an existing specification. It's taken as-is.
    pub fn new_with(specification: PartialSpecification, labels: Labels) -> Self {
        Self {
            specification,
            labels,
        }
    }

    /// Cuts the given envelopes into paxels on the given grid. The returned
    /// error wraps a [MappingError](crate::mapping::MappingError) when the
    /// grid or envelopes are unusable.
    pub fn new_from_envelopes(
        envelopes: &impl ShapesPartial,
        labels: Labels,
        grid: GridSettings,
    ) -> anyhow::Result<Self> {
        let mapper = EnvelopeMapper::new_with(grid, envelopes.sample_rate())?;
        let specification = mapper.map(envelopes)?;
        Ok(Self::new_with(specification, labels))
    }

    #[allow(missing_docs)]
    pub fn partial_specification(&self) -> &PartialSpecification {
        &self.specification
    }

    #[allow(missing_docs)]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Renders the whole partial with the stock [PaxelOscillator].
    pub fn render_audio(&self) -> Vec<Sample> {
        self.render_audio_with(&PaxelOscillator::default())
    }

    /// Renders the whole partial, asking `renderer` for each paxel in turn.
    pub fn render_audio_with<R: RendersPaxel + ?Sized>(&self, renderer: &R) -> Vec<Sample> {
        let samples = Self::render_paxels(
            self.specification.paxels(),
            self.specification.sample_rate(),
            renderer,
        );
        debug!(
            "rendered {} samples from {} paxels",
            samples.len(),
            self.specification.len()
        );
        samples
    }

    /// Renders the whole partial with the stock [PaxelOscillator], splitting
    /// the paxels into up to `workers` contiguous runs that render on their
    /// own threads. The result is identical to [Self::render_audio()].
    pub fn render_audio_in_parallel(&self, workers: usize) -> anyhow::Result<Vec<Sample>> {
        let paxels = self.specification.paxels();
        if paxels.is_empty() {
            return Ok(Vec::default());
        }
        let sample_rate = self.specification.sample_rate();
        let chunk_size = paxels.len().div_ceil(workers.max(1));
        let renderer = PaxelOscillator::default();

        let runs = crossbeam::scope(|s| {
            let handles: Vec<_> = paxels
                .chunks(chunk_size)
                .map(|run| {
                    let renderer = &renderer;
                    s.spawn(move |_| Self::render_paxels(run, sample_rate, renderer))
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join())
                .collect::<Result<Vec<_>, _>>()
        })
        .map_err(|_| anyhow!("a render worker panicked"))?
        .map_err(|_| anyhow!("a render worker panicked"))?;

        debug!(
            "rendered {} paxels on {} threads",
            paxels.len(),
            runs.len()
        );
        Ok(runs.concat())
    }

    fn render_paxels<R: RendersPaxel + ?Sized>(
        paxels: &[PaxelSpecification],
        sample_rate: SampleRate,
        renderer: &R,
    ) -> Vec<Sample> {
        let capacity = paxels.iter().map(|p| p.duration_samples() as usize).sum();
        let mut samples = Vec::with_capacity(capacity);
        for paxel in paxels {
            let rendered = renderer.render_paxel(paxel, sample_rate);
            debug_assert_eq!(
                rendered.len(),
                paxel.duration_samples() as usize,
                "{renderer:?} rendered the wrong number of samples"
            );
            samples.extend(rendered);
        }
        samples
    }
}

/// Renders independent partials concurrently, one thread per partial. Each
/// entry of the result is what that generator's
/// [render_audio()](PartialGenerator::render_audio) would have returned.
pub fn render_partials_in_parallel(
    generators: &[PartialGenerator],
) -> anyhow::Result<Vec<Vec<Sample>>> {
    crossbeam::scope(|s| {
        let handles: Vec<_> = generators
            .iter()
            .map(|g| s.spawn(move |_| g.render_audio()))
            .collect();
        handles
            .into_iter()
            .map(|h| h.join())
            .collect::<Result<Vec<_>, _>>()
    })
    .map_err(|_| anyhow!("a render worker panicked"))?
    .map_err(|_| anyhow!("a render worker panicked"))
}
