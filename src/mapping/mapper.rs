// Copyright (c) 2024 Mike Tsao

use super::arena::PaxelArena;
use crate::{
    elements::phase,
    prelude::*,
    specification::{PartialSpecification, PaxelSpecificationBuilderError},
};
use log::{debug, trace, warn};
use std::collections::BTreeSet;
use thiserror::Error;

/// Reasons that envelopes can't be mapped onto a grid of paxels.
#[derive(Debug, Error)]
pub enum MappingError {
    #[allow(missing_docs)]
    #[error("paxel duration must be at least one sample")]
    ZeroPaxelDuration,
    /// The grid offset has to be shorter than one paxel.
    #[error("grid offset {offset} must be less than the paxel duration {paxel_duration}")]
    OffsetOutOfRange {
        /// The requested offset.
        offset: u32,
        /// The grid's paxel duration.
        paxel_duration: u32,
    },
    #[allow(missing_docs)]
    #[error("envelopes describe a partial with no samples")]
    EmptyEnvelope,
    /// The partial plus its lead-in would run past the last sample position
    /// that a u32 can address.
    #[error("{duration_samples} samples after a lead-in of {lead_in} is too long")]
    PartialTooLong {
        /// The length of the envelopes.
        duration_samples: u32,
        /// The silence that would go before them.
        lead_in: u32,
    },
    /// The envelopes' [PhaseTarget]s are out of order or out of range.
    #[error("invalid phase target: {0}")]
    InvalidPhaseTarget(String),
    /// A staged paxel was incomplete or inconsistent when it was frozen.
    #[error("paxel at sample {position} is invalid: {source}")]
    InvalidSegment {
        /// Where the paxel starts in the partial.
        position: u32,
        /// What the builder objected to.
        #[source]
        source: PaxelSpecificationBuilderError,
    },
}

/// One cell of the grid that a partial is cut into.
#[derive(Clone, Copy, Debug, PartialEq)]
struct GridCell {
    /// Where the paxel starts in the partial.
    position: u32,
    duration: u32,
    /// Where the paxel starts in the envelopes. [None] for the lead-in, which
    /// comes before the envelopes begin.
    envelope_start: Option<u32>,
}
impl GridCell {
    fn envelope_end(&self) -> Option<u32> {
        self.envelope_start.map(|start| start + self.duration)
    }
}

/// Turns a continuous description of a partial ([ShapesPartial]) into the
/// discrete run of paxels ([PartialSpecification]) that a
/// [PartialGenerator](crate::PartialGenerator) renders.
///
/// Grid lines fall every `paxel_duration_samples` of the rendered partial.
/// The envelopes are cut where the grid lines cross them, which is at
/// `offset_samples + k * paxel_duration_samples` into the envelopes. When the
/// offset isn't zero, a silent lead-in paxel reaches back from the start of
/// the envelopes to the previous grid line, so the rendered partial is
/// [GridSettings::lead_in_samples()] longer than the envelopes. Any
/// [PhaseTarget]s add boundaries of their own, and the final paxel is whatever
/// remains.
///
/// Phase is threaded through the paxels so that each one starts exactly where
/// the previous one ended.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeMapper {
    grid: GridSettings,
    sample_rate: SampleRate,
}
impl EnvelopeMapper {
    /// Creates a mapper for the given grid. Fails if the grid is invalid.
    pub fn new_with(grid: GridSettings, sample_rate: SampleRate) -> Result<Self, MappingError> {
        grid.validate()?;
        Ok(Self { grid, sample_rate })
    }

    #[allow(missing_docs)]
    pub fn grid(&self) -> GridSettings {
        self.grid
    }

    #[allow(missing_docs)]
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// Maps the envelopes onto the grid.
    pub fn map(&self, envelopes: &impl ShapesPartial) -> Result<PartialSpecification, MappingError> {
        let cells = self.lay_out(envelopes.duration_samples(), envelopes.phase_targets())?;
        debug!(
            "mapping {} envelope samples onto {} paxels (grid {}, offset {}, {} phase targets)",
            envelopes.duration_samples(),
            cells.len(),
            self.grid.paxel_duration_samples(),
            self.grid.offset_samples(),
            envelopes.phase_targets().len()
        );

        let mut arena = PaxelArena::default();
        self.layout_pass(&mut arena, &cells);
        self.frequency_pass(&mut arena, &cells, envelopes);
        self.amplitude_pass(&mut arena, &cells, envelopes);
        self.phase_pass(&mut arena, &cells, envelopes);

        let paxels = arena.freeze().map_err(|e| {
            warn!("couldn't map envelopes: {e}");
            e
        })?;
        let specification = PartialSpecification::new_with(paxels, self.sample_rate);
        debug_assert!(specification.is_contiguous());
        Ok(specification)
    }

    /// Computes where each paxel goes.
    fn lay_out(
        &self,
        duration_samples: u32,
        phase_targets: &[PhaseTarget],
    ) -> Result<Vec<GridCell>, MappingError> {
        if duration_samples == 0 {
            return Err(MappingError::EmptyEnvelope);
        }
        PhaseTarget::verify_targets(phase_targets, duration_samples)
            .map_err(MappingError::InvalidPhaseTarget)?;
        let lead_in = self.grid.lead_in_samples();
        // The last sample's position must be addressable, and so must the
        // closing boundary after it.
        if duration_samples.checked_add(lead_in).is_none() {
            return Err(MappingError::PartialTooLong {
                duration_samples,
                lead_in,
            });
        }

        // Boundaries, relative to the start of the envelopes.
        let mut boundaries: BTreeSet<u32> = (self.grid.offset_samples()..duration_samples)
            .step_by(self.grid.paxel_duration_samples() as usize)
            .collect();
        boundaries.insert(0);
        boundaries.extend(phase_targets.iter().map(PhaseTarget::when));
        boundaries.insert(duration_samples);

        let mut cells = Vec::with_capacity(boundaries.len());
        if lead_in != 0 {
            cells.push(GridCell {
                position: 0,
                duration: lead_in,
                envelope_start: None,
            });
        }
        cells.extend(
            boundaries
                .iter()
                .zip(boundaries.iter().skip(1))
                .map(|(start, end)| GridCell {
                    position: lead_in + start,
                    duration: end - start,
                    envelope_start: Some(*start),
                }),
        );
        Ok(cells)
    }

    fn layout_pass(&self, arena: &mut PaxelArena, cells: &[GridCell]) {
        for cell in cells {
            arena
                .find_or_insert(cell.position)
                .layout(cell.position, cell.duration);
        }
    }

    /// The lead-in holds the envelope's first frequency.
    fn frequency_pass(&self, arena: &mut PaxelArena, cells: &[GridCell], envelopes: &impl ShapesPartial) {
        for cell in cells {
            let (start, end) = match cell.envelope_start {
                Some(start) => (
                    envelopes.frequency_at(start),
                    envelopes.frequency_at(start + cell.duration),
                ),
                None => (envelopes.frequency_at(0), envelopes.frequency_at(0)),
            };
            arena
                .find_or_insert(cell.position)
                .start_frequency(start)
                .end_frequency(end);
        }
    }

    /// The lead-in is silent.
    fn amplitude_pass(&self, arena: &mut PaxelArena, cells: &[GridCell], envelopes: &impl ShapesPartial) {
        for cell in cells {
            let (start, end) = match cell.envelope_start {
                Some(start) => (
                    envelopes.amplitude_at(start),
                    envelopes.amplitude_at(start + cell.duration),
                ),
                None => (BipolarNormal::zero(), BipolarNormal::zero()),
            };
            arena
                .find_or_insert(cell.position)
                .start_amplitude(start)
                .end_amplitude(end);
        }
    }

    /// Threads phase through the paxels. The envelopes begin at their initial
    /// phase; the lead-in, if any, is wound back so that it ends exactly there.
    /// From then on the paxels are handled in stretches that end at each phase
    /// target and at the end of the partial (see [Self::thread_phase()]).
    fn phase_pass(&self, arena: &mut PaxelArena, cells: &[GridCell], envelopes: &impl ShapesPartial) {
        let initial_phase = envelopes.initial_phase();
        let targets = envelopes.phase_targets();

        let mut cells = cells;
        if let Some((lead_in, rest)) = cells
            .split_first()
            .filter(|(cell, _)| cell.envelope_start.is_none())
        {
            let start_phase = arena
                .get(lead_in.position)
                .and_then(|b| b.staged_phase_advance(self.sample_rate))
                .map(|advance| phase::wrap_phase(initial_phase - advance));
            let builder = arena.find_or_insert(lead_in.position);
            if let Some(start_phase) = start_phase {
                builder.start_phase(start_phase);
            }
            builder.end_phase(initial_phase);
            trace!(
                "lead-in ({} samples): phase {:?} -> {}",
                lead_in.duration,
                start_phase,
                initial_phase
            );
            cells = rest;
        }

        let mut start_phase = initial_phase;
        let mut stretch_start = 0;
        for (i, cell) in cells.iter().enumerate() {
            let target = cell
                .envelope_end()
                .and_then(|end| targets.binary_search_by_key(&end, PhaseTarget::when).ok())
                .map(|index| &targets[index]);
            if target.is_none() && i + 1 != cells.len() {
                continue;
            }
            let stretch = &cells[stretch_start..=i];
            match self.thread_phase(arena, stretch, start_phase, target.and_then(PhaseTarget::phase)) {
                Some(end_phase) => start_phase = end_phase,
                // Whatever's left unset gets reported when the arena freezes.
                None => return,
            }
            stretch_start = i + 1;
        }
    }

    /// Sets the phases of one stretch of paxels, beginning at `start_phase`.
    /// Without a `target`, each paxel ends on its natural phase. With one, the
    /// shortest correction from the stretch's natural end phase to `target` is
    /// spread across the boundaries in proportion to elapsed time, and the
    /// last paxel ends exactly on `target`.
    ///
    /// Returns the phase at the end of the stretch, or [None] if a paxel's
    /// frequencies haven't been staged.
    fn thread_phase(
        &self,
        arena: &mut PaxelArena,
        cells: &[GridCell],
        start_phase: f64,
        target: Option<f64>,
    ) -> Option<f64> {
        let mut natural_ends = Vec::with_capacity(cells.len());
        let mut natural = start_phase;
        for cell in cells {
            let advance = arena
                .get(cell.position)
                .and_then(|b| b.staged_phase_advance(self.sample_rate))?;
            natural = phase::wrap_phase(natural + advance);
            natural_ends.push(natural);
        }

        let correction = target.map_or(0.0, |target| phase::coherence_compensation(natural, target));
        let stretch_samples: u64 = cells.iter().map(|c| c.duration as u64).sum();
        let mut elapsed = 0u64;
        let mut current = start_phase;
        for (cell, natural_end) in cells.iter().zip(natural_ends) {
            elapsed += cell.duration as u64;
            let end_phase = match target {
                Some(target) if elapsed == stretch_samples => target,
                Some(_) => phase::wrap_phase(
                    natural_end + correction * elapsed as f64 / stretch_samples as f64,
                ),
                None => natural_end,
            };
            arena
                .find_or_insert(cell.position)
                .start_phase(current)
                .end_phase(end_phase);
            trace!(
                "paxel at {} ({} samples): phase {} -> {}",
                cell.position,
                cell.duration,
                current,
                end_phase
            );
            current = end_phase;
        }
        Some(current)
    }
}
