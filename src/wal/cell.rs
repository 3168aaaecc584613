//! Cell - A single atomic field change inside an edit

use std::fmt;

use crate::mvcc::SequenceId;

/// One field change: row, family, qualifier, timestamp and value, plus a
/// sequence id that is filled in when the owning edit is sequenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    row: Vec<u8>,
    family: Vec<u8>,
    qualifier: Vec<u8>,
    timestamp: i64,
    value: Vec<u8>,
    sequence_id: SequenceId,
}

impl Cell {
    /// Create a cell with no sequence id yet.
    pub fn new(
        row: impl Into<Vec<u8>>,
        family: impl Into<Vec<u8>>,
        qualifier: impl Into<Vec<u8>>,
        timestamp: i64,
        value: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            row: row.into(),
            family: family.into(),
            qualifier: qualifier.into(),
            timestamp,
            value: value.into(),
            sequence_id: SequenceId::NONE,
        }
    }

    /// Builder form carrying an existing sequence id, as replayed cells do.
    pub fn with_sequence_id(mut self, sequence_id: SequenceId) -> Self {
        self.sequence_id = sequence_id;
        self
    }

    pub fn row(&self) -> &[u8] {
        &self.row
    }

    pub fn family(&self) -> &[u8] {
        &self.family
    }

    pub fn qualifier(&self) -> &[u8] {
        &self.qualifier
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }

    /// Overwrite the sequence id.
    pub fn set_sequence_id(&mut self, sequence_id: SequenceId) {
        self.sequence_id = sequence_id;
    }

    /// Whether this cell belongs to `family`.
    pub fn matches_family(&self, family: &[u8]) -> bool {
        self.family == family
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}:{}/{}/vlen={}/seqid={}",
            String::from_utf8_lossy(&self.row),
            String::from_utf8_lossy(&self.family),
            String::from_utf8_lossy(&self.qualifier),
            self.timestamp,
            self.value.len(),
            self.sequence_id
        )
    }
}
