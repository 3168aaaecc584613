//! Per-region, per-family sequence id accounting
//!
//! Fed by the sequencer after every stamped entry. Tracks, for each
//! region, the highest sequence id written to the log and, for each
//! family with unflushed memstore data, the oldest sequence id that is
//! not yet flushed. Flush and log-roll policy read these numbers; they
//! are not part of this module.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::edit::{Family, FamilyNames};
use crate::mvcc::SequenceId;

#[derive(Debug, Default)]
struct RegionAccounting {
    highest: SequenceId,
    /// Oldest unflushed sequence id per family.
    lowest_unflushed: BTreeMap<Family, SequenceId>,
}

/// Sequence bookkeeping shared by the sequencer and its readers.
#[derive(Debug, Default)]
pub struct SequenceIdAccounting {
    regions: Mutex<HashMap<String, RegionAccounting>>,
}

impl SequenceIdAccounting {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, RegionAccounting>> {
        self.regions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record that `sequence_id` was written for `encoded_region_name`.
    ///
    /// Unassigned ids are ignored. Families only gain an entry when the
    /// edit went to the memstore; an existing lower id is kept.
    pub fn update(
        &self,
        encoded_region_name: &str,
        families: &FamilyNames,
        sequence_id: SequenceId,
        in_memstore: bool,
    ) {
        if !sequence_id.is_assigned() {
            return;
        }
        let mut regions = self.lock();
        let region = regions.entry(encoded_region_name.to_string()).or_default();
        if sequence_id > region.highest {
            region.highest = sequence_id;
        }
        if in_memstore {
            for family in families {
                region
                    .lowest_unflushed
                    .entry(family.clone())
                    .or_insert(sequence_id);
            }
        }
    }

    /// Highest sequence id written for the region, `SequenceId::NONE` if
    /// the region was never seen.
    pub fn highest_sequence_id(&self, encoded_region_name: &str) -> SequenceId {
        self.lock()
            .get(encoded_region_name)
            .map_or(SequenceId::NONE, |r| r.highest)
    }

    /// Oldest unflushed sequence id across the region's families.
    pub fn lowest_unflushed(&self, encoded_region_name: &str) -> SequenceId {
        self.lock()
            .get(encoded_region_name)
            .and_then(|r| r.lowest_unflushed.values().min().copied())
            .unwrap_or(SequenceId::NONE)
    }

    /// Oldest unflushed sequence id for one family.
    pub fn lowest_unflushed_for_family(&self, encoded_region_name: &str, family: &[u8]) -> SequenceId {
        self.lock()
            .get(encoded_region_name)
            .and_then(|r| r.lowest_unflushed.get(family).copied())
            .unwrap_or(SequenceId::NONE)
    }

    /// Number of regions with any recorded writes.
    pub fn region_count(&self) -> usize {
        self.lock().len()
    }
}
