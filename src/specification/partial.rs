// Copyright (c) 2024 Mike Tsao

use super::PaxelSpecification;
use crate::prelude::*;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};

/// The complete, frozen description of one partial: a time-ordered run of
/// [PaxelSpecification]s that together cover `[0, total_duration_samples())`,
/// plus the sample rate that their phases were computed for.
///
/// A [PartialSpecification] is a self-contained unit of work. It can be
/// produced in one place, serialized, and rendered somewhere else.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PartialSpecification {
    paxels: Vec<PaxelSpecification>,
    sample_rate: SampleRate,
}
impl PartialSpecification {
    /// Wraps the given paxels as-is. Callers that assemble paxels by hand are
    /// responsible for keeping them contiguous; see [Self::is_contiguous()].
    pub fn new_with(paxels: Vec<PaxelSpecification>, sample_rate: SampleRate) -> Self {
        Self {
            paxels,
            sample_rate,
        }
    }

    /// The paxels, in time order.
    pub fn paxels(&self) -> &[PaxelSpecification] {
        &self.paxels
    }

    #[allow(missing_docs)]
    pub fn iter(&self) -> core::slice::Iter<'_, PaxelSpecification> {
        self.paxels.iter()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.paxels.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.paxels.is_empty()
    }

    /// The sample rate the paxels' phases assume.
    pub fn sample_rate(&self) -> SampleRate {
        self.sample_rate
    }

    /// The sum of all paxel durations, which is also the length of the
    /// rendered partial.
    pub fn total_duration_samples(&self) -> u64 {
        self.paxels
            .iter()
            .map(|p| p.duration_samples() as u64)
            .sum()
    }

    /// Whether the paxels start at sample zero and each one begins on the
    /// sample after the previous one ends. An empty specification is
    /// trivially contiguous.
    pub fn is_contiguous(&self) -> bool {
        let mut next_start = 0u64;
        for p in self.paxels.iter() {
            if p.start_sample() as u64 != next_start {
                return false;
            }
            next_start = p.end_sample() as u64 + 1;
        }
        true
    }

    /// Serializes to JSON.
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserializes from JSON, then rechecks what a builder would have
    /// checked, since the text could have come from anywhere.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let specification: Self = serde_json::from_str(json)?;
        for p in specification.paxels.iter() {
            p.validate()
                .map_err(|e| anyhow!("paxel at sample {}: {e}", p.start_sample()))?;
        }
        if !specification.is_contiguous() {
            return Err(anyhow!("paxels are not contiguous"));
        }
        Ok(specification)
    }
}
impl<'a> IntoIterator for &'a PartialSpecification {
    type Item = &'a PaxelSpecification;
    type IntoIter = core::slice::Iter<'a, PaxelSpecification>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
