//! WalKey - Per-entry log key
//!
//! Holds the slot the region sequence id lands in, plus the MVCC write
//! handle that produced it. A key arrives at the sequencer either empty
//! or carrying a handle some upstream path already allocated.

use std::fmt;

use chrono::{DateTime, Utc};

use super::region::{RegionInfo, TableName};
use crate::mvcc::{SequenceId, WriteEntry};

/// Log key for one WAL entry.
#[derive(Debug, Clone)]
pub struct WalKey {
    encoded_region_name: String,
    table_name: TableName,
    write_time: DateTime<Utc>,
    /// `SequenceId::NONE` until the entry is sequenced.
    sequence_id: SequenceId,
    /// Handle allocated before the entry reached the sequencer.
    pre_assigned_write_entry: Option<WriteEntry>,
    /// Handle allocated by the sequencer itself.
    write_entry: Option<WriteEntry>,
}

impl WalKey {
    /// Key for an edit to `region`, timestamped now.
    pub fn new(region: &RegionInfo) -> Self {
        Self::with_write_time(region, Utc::now())
    }

    pub fn with_write_time(region: &RegionInfo, write_time: DateTime<Utc>) -> Self {
        Self {
            encoded_region_name: region.encoded_name().to_string(),
            table_name: region.table().clone(),
            write_time,
            sequence_id: SequenceId::NONE,
            pre_assigned_write_entry: None,
            write_entry: None,
        }
    }

    /// Attach a write handle allocated upstream; sequencing will use its
    /// number instead of allocating.
    pub fn with_pre_assigned_write_entry(mut self, write_entry: WriteEntry) -> Self {
        self.pre_assigned_write_entry = Some(write_entry);
        self
    }

    pub fn encoded_region_name(&self) -> &str {
        &self.encoded_region_name
    }

    pub fn table_name(&self) -> &TableName {
        &self.table_name
    }

    pub fn write_time(&self) -> DateTime<Utc> {
        self.write_time
    }

    pub fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }

    pub fn pre_assigned_write_entry(&self) -> Option<&WriteEntry> {
        self.pre_assigned_write_entry.as_ref()
    }

    /// The handle the sequencer allocated, if it had to allocate one.
    ///
    /// Downstream visibility code completes this after the write is durable.
    pub fn write_entry(&self) -> Option<&WriteEntry> {
        self.write_entry.as_ref()
    }

    /// Record a newly allocated handle and take its number as sequence id.
    pub(crate) fn set_write_entry(&mut self, write_entry: WriteEntry) {
        self.sequence_id = write_entry.sequence_id();
        self.write_entry = Some(write_entry);
    }

    pub(crate) fn set_sequence_id(&mut self, sequence_id: SequenceId) {
        self.sequence_id = sequence_id;
    }
}

impl fmt::Display for WalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.table_name, self.encoded_region_name, self.sequence_id
        )
    }
}
