//! SequenceId - Per-region edit ordering identity
//!
//! A region sequence id totally orders the edits applied to one region.
//! It is the MVCC write number handed out when the edit was sequenced,
//! copied into the WAL key and into every cell of the edit.
//!
//! `SequenceId::NONE` marks a slot that has not been assigned.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A region-scoped, totally ordered sequence identity.
///
/// Wraps a signed 64-bit value so that the unassigned sentinel (`-1`)
/// sorts below every real sequence id.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct SequenceId(i64);

impl SequenceId {
    /// Sentinel for "no sequence id assigned".
    pub const NONE: SequenceId = SequenceId(-1);

    /// Creates a new SequenceId with the given value.
    #[inline]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the underlying value.
    #[inline]
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Whether this id was produced by sequencing (i.e. is not the sentinel).
    #[inline]
    pub fn is_assigned(&self) -> bool {
        self.0 >= 0
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_unassigned() {
        assert!(!SequenceId::NONE.is_assigned());
        assert_eq!(SequenceId::NONE.value(), -1);
        assert_eq!(SequenceId::default(), SequenceId::NONE);
    }

    #[test]
    fn test_zero_is_assigned() {
        assert!(SequenceId::new(0).is_assigned());
    }

    #[test]
    fn test_none_sorts_first() {
        assert!(SequenceId::NONE < SequenceId::new(0));
        assert!(SequenceId::new(7) < SequenceId::new(8));
    }

    #[test]
    fn test_display() {
        assert_eq!(SequenceId::new(42).to_string(), "42");
        assert_eq!(SequenceId::NONE.to_string(), "-1");
    }

    #[test]
    fn test_serde_transparent_value() {
        let json = serde_json::to_string(&SequenceId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: SequenceId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, SequenceId::new(9));
    }
}
