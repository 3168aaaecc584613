//! Sequencing lifecycle events
//!
//! Every line the sequencer logs names one of these events. Names are
//! stable uppercase identifiers so log consumers can match on them.

use std::fmt;

use super::Severity;

/// Observable events on the sequencing path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Consumer loop started draining the transport
    SequencerStart,
    /// All producers gone, consumer loop finished
    SequencerStop,

    // Stamping
    /// Fresh entry received a newly allocated sequence id
    EntryStamped,
    /// Fresh entry took its sequence id from a pre-assigned handle
    PreAssignedUsed,
    /// Entry sequenced without an allocator
    EntryUnsequenced,
    /// Rewritten entry passed through with its existing sequence id
    RestampSkipped,
    /// Replayed edit kept its original cell sequence ids
    ReplayPreserved,

    // Failures
    /// Allocator refused to hand out a write number (FATAL)
    AllocationFailed,
    /// Entry arrived with a txid not above the previous one (FATAL)
    OutOfOrder,
    /// Sink refused a stamped entry; entry returned for rewrite
    SinkRejected,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::SequencerStart => "SEQUENCER_START",
            Event::SequencerStop => "SEQUENCER_STOP",

            Event::EntryStamped => "ENTRY_STAMPED",
            Event::PreAssignedUsed => "PRE_ASSIGNED_WRITE_USED",
            Event::EntryUnsequenced => "ENTRY_UNSEQUENCED",
            Event::RestampSkipped => "RESTAMP_SKIPPED",
            Event::ReplayPreserved => "REPLAY_PRESERVED",

            Event::AllocationFailed => "MVCC_ALLOCATION_FAILED",
            Event::OutOfOrder => "ENTRY_OUT_OF_ORDER",
            Event::SinkRejected => "SINK_REJECTED",
        }
    }

    /// Returns true if this event aborts the write attempt
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::AllocationFailed | Event::OutOfOrder)
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::AllocationFailed | Event::OutOfOrder => Severity::Fatal,
            Event::SinkRejected => Severity::Warn,
            Event::EntryStamped
            | Event::PreAssignedUsed
            | Event::EntryUnsequenced
            | Event::RestampSkipped
            | Event::ReplayPreserved => Severity::Trace,
            Event::SequencerStart | Event::SequencerStop => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
