//! WAL entry in transit from producers to the sequencer
//!
//! An entry wraps a key and an edit together with metadata that only
//! lives while the entry crosses the transport queue: the producer's
//! transaction id, whether the edit goes to the memstore, the owning
//! region, and the set of families the edit touches. None of it is
//! persisted.
//!
//! Sequencing is a one-way state change. `WalEntry<Unstamped>` is
//! consumed by `stamp_region_sequence_id` and comes out as
//! `WalEntry<Stamped>`, which can only report the id it already has.
//! A stamped entry that failed to reach the log is resubmitted as is and
//! never sees a second allocation.

use std::fmt;
use std::sync::Arc;

use super::edit::{FamilyNames, WalEdit};
use super::errors::StampError;
use super::key::WalKey;
use super::region::RegionInfo;
use crate::mvcc::{MvccAllocator, SequenceId, WriteEntry};

/// State of an entry that has not been sequenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unstamped;

/// State of a sequenced entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stamped {
    sequence_id: SequenceId,
    source: SequenceSource,
    cells_stamped: usize,
}

/// Where a stamped entry's sequence id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceSource {
    /// The key already carried a write handle.
    PreAssigned,
    /// The allocator handed out a new write number.
    Allocated,
    /// No handle and no allocator; the id is `SequenceId::NONE`.
    Unsequenced,
}

/// A WAL key and edit plus transport metadata.
#[derive(Debug)]
pub struct WalEntry<S> {
    txid: u64,
    key: WalKey,
    edit: WalEdit,
    region: Arc<RegionInfo>,
    in_memstore: bool,
    family_names: FamilyNames,
    state: S,
}

impl WalEntry<Unstamped> {
    /// Build an entry at enqueue time.
    ///
    /// `txid` must already reflect the producer-side order. When the edit
    /// is bound for the memstore its families are collected once here, so
    /// downstream bookkeeping never rescans the cells.
    ///
    /// `key` is expected to be fresh from `WalKey::new`; keys only gain a
    /// sequence id through stamping, and stamping overwrites whatever the
    /// slot holds.
    pub fn new(
        txid: u64,
        key: WalKey,
        edit: WalEdit,
        region: Arc<RegionInfo>,
        in_memstore: bool,
    ) -> Self {
        let family_names = if in_memstore {
            FamilyNames::from_cells(edit.cells())
        } else {
            FamilyNames::empty()
        };
        Self {
            txid,
            key,
            edit,
            region,
            in_memstore,
            family_names,
            state: Unstamped,
        }
    }

    /// Assign this entry its region sequence id.
    ///
    /// Uses the key's pre-assigned write handle when there is one;
    /// otherwise asks `mvcc` for a new write number. Without either the id
    /// is `SequenceId::NONE`. The id is written into every cell unless the
    /// edit is a replay or is not bound for the memstore, and a newly
    /// allocated handle is recorded on the key so it can be completed
    /// once the write is durable.
    ///
    /// # Errors
    ///
    /// Allocation failures from `mvcc` are returned unchanged inside a
    /// `StampError` that also hands back this entry, untouched.
    pub fn stamp_region_sequence_id(
        mut self,
        mvcc: Option<&dyn MvccAllocator>,
    ) -> Result<WalEntry<Stamped>, StampError> {
        let (write_entry, source) = match self.key.pre_assigned_write_entry().cloned() {
            Some(pre_assigned) => (Some(pre_assigned), SequenceSource::PreAssigned),
            None => match mvcc {
                Some(allocator) => match allocator.begin() {
                    Ok(allocated) => (Some(allocated), SequenceSource::Allocated),
                    Err(source) => return Err(StampError { entry: self, source }),
                },
                None => (None, SequenceSource::Unsequenced),
            },
        };

        let sequence_id = write_entry
            .as_ref()
            .map_or(SequenceId::NONE, WriteEntry::sequence_id);

        let mut cells_stamped = 0;
        if !self.edit.is_replay() && self.in_memstore {
            for cell in self.edit.cells_mut() {
                cell.set_sequence_id(sequence_id);
                cells_stamped += 1;
            }
        }

        match (source, write_entry) {
            (SequenceSource::Allocated, Some(allocated)) => self.key.set_write_entry(allocated),
            _ => self.key.set_sequence_id(sequence_id),
        }

        Ok(WalEntry {
            txid: self.txid,
            key: self.key,
            edit: self.edit,
            region: self.region,
            in_memstore: self.in_memstore,
            family_names: self.family_names,
            state: Stamped {
                sequence_id,
                source,
                cells_stamped,
            },
        })
    }
}

impl WalEntry<Stamped> {
    /// The region sequence id assigned at stamping.
    pub fn sequence_id(&self) -> SequenceId {
        self.state.sequence_id
    }

    /// Stamping an already stamped entry is a no-op that reports the
    /// recorded id.
    pub fn stamp_region_sequence_id(&self) -> SequenceId {
        self.state.sequence_id
    }

    pub fn sequence_source(&self) -> SequenceSource {
        self.state.source
    }

    /// Number of cells that received the sequence id.
    pub fn cells_stamped(&self) -> usize {
        self.state.cells_stamped
    }

    /// Handle to complete once this entry is durable.
    ///
    /// Only present when stamping allocated it; a pre-assigned handle is
    /// completed by whoever assigned it.
    pub fn write_entry(&self) -> Option<&WriteEntry> {
        self.key.write_entry()
    }

    /// Give up the entry, keeping the stamped key and edit.
    pub fn into_parts(self) -> (WalKey, WalEdit) {
        (self.key, self.edit)
    }
}

impl<S> WalEntry<S> {
    /// Transaction id assigned by the producer.
    pub fn txid(&self) -> u64 {
        self.txid
    }

    pub fn key(&self) -> &WalKey {
        &self.key
    }

    pub fn edit(&self) -> &WalEdit {
        &self.edit
    }

    pub fn region(&self) -> &RegionInfo {
        &self.region
    }

    /// Shared handle to the region, for collaborators that outlive the entry.
    pub fn region_handle(&self) -> Arc<RegionInfo> {
        Arc::clone(&self.region)
    }

    pub fn is_in_memstore(&self) -> bool {
        self.in_memstore
    }

    /// Families this edit touches, meta family excluded. Empty when the
    /// edit is not bound for the memstore.
    pub fn family_names(&self) -> &FamilyNames {
        &self.family_names
    }
}

impl<S> fmt::Display for WalEntry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sequence={}, {}={}", self.txid, self.key, self.edit)
    }
}

/// What travels over the transport queue: a fresh entry, or one that was
/// already stamped and is being rewritten after a failed append.
#[derive(Debug)]
pub enum PendingEntry {
    Unstamped(WalEntry<Unstamped>),
    Stamped(WalEntry<Stamped>),
}

impl PendingEntry {
    pub fn txid(&self) -> u64 {
        match self {
            PendingEntry::Unstamped(entry) => entry.txid(),
            PendingEntry::Stamped(entry) => entry.txid(),
        }
    }

    pub fn is_stamped(&self) -> bool {
        matches!(self, PendingEntry::Stamped(_))
    }

    /// Stamp a fresh entry, or pass a stamped one through untouched.
    pub fn stamp_region_sequence_id(
        self,
        mvcc: Option<&dyn MvccAllocator>,
    ) -> Result<WalEntry<Stamped>, StampError> {
        match self {
            PendingEntry::Unstamped(entry) => entry.stamp_region_sequence_id(mvcc),
            PendingEntry::Stamped(entry) => Ok(entry),
        }
    }
}

impl From<WalEntry<Unstamped>> for PendingEntry {
    fn from(entry: WalEntry<Unstamped>) -> Self {
        PendingEntry::Unstamped(entry)
    }
}

impl From<WalEntry<Stamped>> for PendingEntry {
    fn from(entry: WalEntry<Stamped>) -> Self {
        PendingEntry::Stamped(entry)
    }
}

impl fmt::Display for PendingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PendingEntry::Unstamped(entry) => fmt::Display::fmt(entry, f),
            PendingEntry::Stamped(entry) => fmt::Display::fmt(entry, f),
        }
    }
}
