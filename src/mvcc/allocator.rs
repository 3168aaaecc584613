//! MVCC allocator seam
//!
//! The sequencing path only needs two things from MVCC: a new write
//! number, and later a way to publish it. Both are behind this trait so
//! the stamping operation can take the allocator as an explicit argument
//! and tests can inject a fake.

use super::WriteEntry;
use crate::wal::SequenceResult;

/// Issues monotonically increasing write numbers and completes them.
///
/// Implementations serialise `begin` internally; concurrent callers must
/// never observe the same or a decreasing write number.
pub trait MvccAllocator: Send + Sync {
    /// Allocate the next write number.
    ///
    /// Errors are propagated unchanged through the stamping operation.
    fn begin(&self) -> SequenceResult<WriteEntry>;

    /// Mark a write complete so readers may see it.
    ///
    /// Returns whether the write is visible once this call returns.
    fn complete(&self, write_entry: &WriteEntry) -> bool;
}

impl<A: MvccAllocator + ?Sized> MvccAllocator for std::sync::Arc<A> {
    fn begin(&self) -> SequenceResult<WriteEntry> {
        (**self).begin()
    }

    fn complete(&self, write_entry: &WriteEntry) -> bool {
        (**self).complete(write_entry)
    }
}
