//! WAL entry sequencing for aerowal
//!
//! An edit becomes ordered on the log and visible to readers through one
//! step: the sequencer stamps it with a region sequence id drawn from
//! MVCC. Everything in this module exists to make that step happen
//! exactly once per entry.
//!
//! # Design Principles
//!
//! - One consumer stamps; producers never touch sequencing state
//! - Stamping is a one-way type transition, not a runtime flag
//! - The allocator is passed in, never looked up
//! - Failures hand the entry back; nothing is half stamped
//!
//! # Invariants Enforced
//!
//! - Every cell of a memstore edit carries its entry's sequence id
//! - Replayed edits keep the sequence ids they arrived with
//! - A resubmitted entry is never allocated a second write number
//! - Entries stamped in txid order receive increasing sequence ids

mod accounting;
mod cell;
mod checksum;
mod config;
mod edit;
mod entry;
mod errors;
mod key;
mod region;
mod sequencer;
mod sink;

pub use accounting::SequenceIdAccounting;
pub use cell::Cell;
pub use checksum::{compute_checksum, verify_checksum};
pub use config::SequencerConfig;
pub use edit::{compare_bytes, Family, FamilyNames, WalEdit, METAFAMILY};
pub use entry::{PendingEntry, SequenceSource, Stamped, Unstamped, WalEntry};
pub use errors::{Rejected, SequenceError, SequenceResult, Severity, StampError};
pub use key::WalKey;
pub use region::{RegionInfo, TableName};
pub use sequencer::{EntryProducer, Sequencer};
pub use sink::{AppendedEntry, EntrySink, MemorySink};
