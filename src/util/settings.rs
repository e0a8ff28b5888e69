// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about various parts of the
//! system. Intended to be serialized.

use crate::mapping::MappingError;
use derivative::Derivative;
use serde::{Deserialize, Serialize};

/// Describes the grid that partials are cut into. Grid lines fall every
/// `paxel_duration_samples`, and the envelopes are positioned so that one of
/// them lands `offset_samples` after the envelopes begin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct GridSettings {
    #[derivative(Default(value = "Self::DEFAULT_PAXEL_DURATION_SAMPLES"))]
    paxel_duration_samples: u32,
    offset_samples: u32,
}
impl GridSettings {
    /// The paxel length used unless configured otherwise.
    pub const DEFAULT_PAXEL_DURATION_SAMPLES: u32 = 4096;

    /// Creates a [GridSettings]. Doesn't validate; see [Self::validate()].
    pub fn new_with(paxel_duration_samples: u32, offset_samples: u32) -> Self {
        Self {
            paxel_duration_samples,
            offset_samples,
        }
    }

    /// The length of every whole paxel, in samples.
    pub fn paxel_duration_samples(&self) -> u32 {
        self.paxel_duration_samples
    }

    /// How far the grid is shifted from sample zero.
    pub fn offset_samples(&self) -> u32 {
        self.offset_samples
    }

    /// The silence that goes before the envelopes so that the grid line
    /// `offset_samples` into them falls on a whole multiple of
    /// `paxel_duration_samples` in the rendered partial. Zero when there's no
    /// offset. Only meaningful for a valid grid.
    pub fn lead_in_samples(&self) -> u32 {
        match self.offset_samples {
            0 => 0,
            offset => self.paxel_duration_samples.saturating_sub(offset),
        }
    }

    /// Paxels must be at least one sample long, and the offset must be shorter
    /// than one paxel.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.paxel_duration_samples == 0 {
            return Err(MappingError::ZeroPaxelDuration);
        }
        if self.offset_samples >= self.paxel_duration_samples {
            return Err(MappingError::OffsetOutOfRange {
                offset: self.offset_samples,
                paxel_duration: self.paxel_duration_samples,
            });
        }
        Ok(())
    }
}
