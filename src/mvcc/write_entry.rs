//! WriteEntry - Handle for an in-flight MVCC write
//!
//! A WriteEntry is issued by `begin()` and stays in the allocator's
//! queue until it is completed. The handle is cheap to clone; every clone
//! observes the same completion flag.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::SequenceId;

/// An allocated, not yet necessarily completed, MVCC write slot.
#[derive(Clone)]
pub struct WriteEntry {
    write_number: i64,
    completed: Arc<AtomicBool>,
}

impl WriteEntry {
    /// Create a handle for the given write number.
    ///
    /// Normally only allocators call this. Upstream coordination paths that
    /// pre-assign a write number build one directly.
    pub fn new(write_number: i64) -> Self {
        Self {
            write_number,
            completed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// The write number carried by this handle.
    #[inline]
    pub fn write_number(&self) -> i64 {
        self.write_number
    }

    /// The write number as a region sequence id.
    #[inline]
    pub fn sequence_id(&self) -> SequenceId {
        SequenceId::new(self.write_number)
    }

    /// Whether `complete` has been called for this write.
    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    pub(crate) fn mark_completed(&self) {
        self.completed.store(true, Ordering::Release);
    }

    /// Whether two handles refer to the same allocation.
    pub fn same_allocation(&self, other: &WriteEntry) -> bool {
        Arc::ptr_eq(&self.completed, &other.completed)
    }
}

impl fmt::Debug for WriteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteEntry")
            .field("write_number", &self.write_number)
            .field("completed", &self.is_completed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_not_completed() {
        let we = WriteEntry::new(3);
        assert_eq!(we.write_number(), 3);
        assert_eq!(we.sequence_id(), SequenceId::new(3));
        assert!(!we.is_completed());
    }

    #[test]
    fn test_clones_share_completion() {
        let we = WriteEntry::new(1);
        let clone = we.clone();
        we.mark_completed();
        assert!(clone.is_completed());
        assert!(we.same_allocation(&clone));
    }

    #[test]
    fn test_distinct_allocations() {
        let a = WriteEntry::new(1);
        let b = WriteEntry::new(1);
        assert!(!a.same_allocation(&b));
    }
}
