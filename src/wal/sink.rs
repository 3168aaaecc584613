//! Downstream seam for stamped entries
//!
//! The sequencer hands each stamped entry to an `EntrySink`. In a
//! running system that is the log writer; `MemorySink` keeps entries in
//! memory for tests and tooling.

use std::sync::Arc;

use super::checksum::{compute_checksum, verify_checksum};
use super::edit::{FamilyNames, WalEdit};
use super::entry::{Stamped, WalEntry};
use super::errors::{SequenceError, SequenceResult};
use super::key::WalKey;
use crate::mvcc::{MvccAllocator, SequenceId};

/// Receives stamped entries in sequencing order.
pub trait EntrySink {
    /// Append one entry.
    ///
    /// On error the sequencer returns the entry to its caller for a
    /// rewrite; the entry keeps its sequence id.
    fn append(&mut self, entry: &WalEntry<Stamped>) -> SequenceResult<()>;
}

/// What `MemorySink` keeps of each appended entry.
#[derive(Debug, Clone)]
pub struct AppendedEntry {
    pub txid: u64,
    pub sequence_id: SequenceId,
    pub key: WalKey,
    pub edit: WalEdit,
    pub family_names: FamilyNames,
    /// CRC32 of the key and edit as they were appended.
    pub checksum: u32,
}

impl AppendedEntry {
    /// Whether the stored key and edit still match the recorded checksum.
    pub fn verify(&self) -> bool {
        verify_checksum(&self.key, &self.edit, self.checksum)
    }
}

/// Collects appended entries in memory.
#[derive(Default)]
pub struct MemorySink {
    entries: Vec<AppendedEntry>,
    /// Completes each allocated write after recording it.
    completion: Option<Arc<dyn MvccAllocator>>,
    /// Number of upcoming appends to refuse.
    fail_next: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete each entry's write handle on `mvcc` once it is recorded,
    /// making the edit visible to readers.
    pub fn with_completion(mvcc: Arc<dyn MvccAllocator>) -> Self {
        Self {
            completion: Some(mvcc),
            ..Self::default()
        }
    }

    /// Refuse the next `count` appends.
    pub fn fail_next(&mut self, count: usize) {
        self.fail_next = count;
    }

    pub fn entries(&self) -> &[AppendedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sequence ids in append order.
    pub fn sequence_ids(&self) -> Vec<SequenceId> {
        self.entries.iter().map(|e| e.sequence_id).collect()
    }
}

impl EntrySink for MemorySink {
    fn append(&mut self, entry: &WalEntry<Stamped>) -> SequenceResult<()> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(SequenceError::SinkFailed(format!(
                "append refused for txid {}",
                entry.txid()
            )));
        }
        self.entries.push(AppendedEntry {
            txid: entry.txid(),
            sequence_id: entry.sequence_id(),
            key: entry.key().clone(),
            edit: entry.edit().clone(),
            family_names: entry.family_names().clone(),
            checksum: compute_checksum(entry.key(), entry.edit()),
        });
        if let (Some(mvcc), Some(write_entry)) = (&self.completion, entry.write_entry()) {
            mvcc.complete(write_entry);
        }
        Ok(())
    }
}
