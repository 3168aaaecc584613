//! Sequencing error types
//!
//! Error codes:
//! - AERO_SEQ_ALLOCATION_FAILED (FATAL severity)
//! - AERO_SEQ_OUT_OF_ORDER (FATAL severity)
//! - AERO_SEQ_SINK_FAILED (ERROR severity)
//! - AERO_SEQ_TRANSPORT_CLOSED (ERROR severity)
//! - AERO_SEQ_INVALID_CONFIG (ERROR severity)
//!
//! A fatal error aborts the current write attempt; the caller is expected
//! to roll the log and resubmit the same entry.

use std::fmt;

use thiserror::Error;

use super::entry::{PendingEntry, Unstamped, WalEntry};

/// Severity levels for sequencing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Operation fails, pipeline continues
    Error,
    /// Write attempt must be aborted
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Failure surfaced at the sequencing boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    /// The MVCC allocator could not hand out a write number.
    #[error("MVCC allocation failed: {0}")]
    AllocationFailed(String),

    /// A fresh entry arrived with a transaction id not above the last one.
    #[error("entry delivered out of order: txid {txid} after {last_txid}")]
    OutOfOrder { txid: u64, last_txid: u64 },

    /// The downstream sink refused a stamped entry.
    #[error("sink rejected entry: {0}")]
    SinkFailed(String),

    /// The consumer side of the transport is gone.
    #[error("transport closed")]
    TransportClosed,

    /// Sequencer configuration failed validation or parsing.
    #[error("invalid sequencer config: {0}")]
    InvalidConfig(String),
}

impl SequenceError {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SequenceError::AllocationFailed(_) => "AERO_SEQ_ALLOCATION_FAILED",
            SequenceError::OutOfOrder { .. } => "AERO_SEQ_OUT_OF_ORDER",
            SequenceError::SinkFailed(_) => "AERO_SEQ_SINK_FAILED",
            SequenceError::TransportClosed => "AERO_SEQ_TRANSPORT_CLOSED",
            SequenceError::InvalidConfig(_) => "AERO_SEQ_INVALID_CONFIG",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SequenceError::AllocationFailed(_) => Severity::Fatal,
            SequenceError::OutOfOrder { .. } => Severity::Fatal,
            SequenceError::SinkFailed(_) => Severity::Error,
            SequenceError::TransportClosed => Severity::Error,
            SequenceError::InvalidConfig(_) => Severity::Error,
        }
    }

    /// Returns whether this error is fatal to the write attempt
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

/// Result type for sequencing operations
pub type SequenceResult<T> = Result<T, SequenceError>;

/// Stamping failed; the entry is handed back exactly as it was submitted.
#[derive(Debug, Error)]
#[error("[{}] {}: {source}", .source.severity(), .source.code())]
pub struct StampError {
    /// The untouched entry, ready to be resubmitted.
    pub entry: WalEntry<Unstamped>,
    /// Why stamping failed.
    #[source]
    pub source: SequenceError,
}

impl StampError {
    /// Split into the returned entry and the cause.
    pub fn into_parts(self) -> (WalEntry<Unstamped>, SequenceError) {
        (self.entry, self.source)
    }
}

/// A sequencer step failed; the entry comes back in whatever state it
/// reached so the caller can resubmit it.
#[derive(Debug, Error)]
#[error("[{}] {}: {error}", .error.severity(), .error.code())]
pub struct Rejected {
    /// The entry, stamped if stamping had already succeeded.
    pub entry: PendingEntry,
    /// Why the step failed.
    #[source]
    pub error: SequenceError,
}

impl From<StampError> for Rejected {
    fn from(err: StampError) -> Self {
        Self {
            entry: PendingEntry::Unstamped(err.entry),
            error: err.source,
        }
    }
}
