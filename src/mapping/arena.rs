// Copyright (c) 2024 Mike Tsao

use super::MappingError;
use crate::specification::{PaxelSpecification, PaxelSpecificationBuilder};
use std::collections::BTreeMap;

/// A paxel under construction, tagged with where it starts in the partial.
#[derive(Debug)]
pub(crate) struct PaxelInPartial {
    pub(crate) position: u32,
    pub(crate) builder: PaxelSpecificationBuilder,
}

/// Staging area for the paxels of one partial while the mapper's passes fill
/// them in. Entries live in a flat vector and are looked up by start position,
/// so each pass can find the paxel it wants (or create it) without anyone
/// holding a reference across passes.
#[derive(Debug, Default)]
pub(crate) struct PaxelArena {
    entries: Vec<PaxelInPartial>,
    index: BTreeMap<u32, usize>,
}
impl PaxelArena {
    /// Returns the builder for the paxel starting at `position`, creating an
    /// empty one if this is the first time anyone asked.
    pub(crate) fn find_or_insert(&mut self, position: u32) -> &mut PaxelSpecificationBuilder {
        let index = match self.index.get(&position) {
            Some(index) => *index,
            None => {
                self.entries.push(PaxelInPartial {
                    position,
                    builder: PaxelSpecificationBuilder::default(),
                });
                let index = self.entries.len() - 1;
                self.index.insert(position, index);
                index
            }
        };
        &mut self.entries[index].builder
    }

    pub(crate) fn get(&self, position: u32) -> Option<&PaxelSpecificationBuilder> {
        self.index
            .get(&position)
            .map(|index| &self.entries[*index].builder)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries in ascending position order, regardless of insertion order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &PaxelInPartial> {
        self.index.values().map(|index| &self.entries[*index])
    }

    /// Freezes every staged paxel, in position order. Stops at the first one
    /// that can't be built.
    pub(crate) fn freeze(&self) -> Result<Vec<PaxelSpecification>, MappingError> {
        self.iter()
            .map(|entry| {
                entry
                    .builder
                    .build()
                    .map_err(|source| MappingError::InvalidSegment {
                        position: entry.position,
                        source,
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_or_insert_reuses_entries() {
        let mut arena = PaxelArena::default();
        arena.find_or_insert(100).start_frequency(440.0);
        arena.find_or_insert(0).start_frequency(220.0);
        arena.find_or_insert(100).end_frequency(880.0);
        assert_eq!(arena.len(), 2);

        let mut expected = PaxelSpecificationBuilder::default();
        expected.start_frequency(440.0).end_frequency(880.0);
        assert_eq!(arena.get(100), Some(&expected));
        assert!(arena.get(50).is_none());
    }

    #[test]
    fn iteration_is_by_position() {
        let mut arena = PaxelArena::default();
        for position in [300, 0, 200, 100] {
            arena.find_or_insert(position);
        }
        assert_eq!(
            arena.iter().map(|e| e.position).collect::<Vec<_>>(),
            vec![0, 100, 200, 300]
        );
    }

    #[test]
    fn freeze_reports_the_first_bad_paxel() {
        let mut arena = PaxelArena::default();
        for position in [0, 10] {
            arena
                .find_or_insert(position)
                .start_frequency(100.0)
                .end_frequency(100.0)
                .start_amplitude(0.0)
                .end_amplitude(0.0)
                .start_phase(0.0)
                .end_phase(0.0)
                .layout(position, 10);
        }
        assert_eq!(arena.freeze().unwrap().len(), 2);

        arena.find_or_insert(20).layout(20, 10);
        match arena.freeze() {
            Err(MappingError::InvalidSegment { position, .. }) => assert_eq!(position, 20),
            other => panic!("expected an invalid segment, got {other:?}"),
        }
    }
}
