//! MVCC collaborators for region sequencing
//!
//! This module provides:
//! - `SequenceId` - Region-scoped edit ordering identity
//! - `WriteEntry` - Handle for an allocated MVCC write slot
//! - `MvccAllocator` - The seam the stamping operation allocates through
//! - `Mvcc` - In-memory reference allocator with read point tracking
//!
//! The sequencing core never holds an allocator implicitly; callers pass
//! one to each stamping call.

mod allocator;
mod control;
mod sequence_id;
mod write_entry;

pub use allocator::MvccAllocator;
pub use control::Mvcc;
pub use sequence_id::SequenceId;
pub use write_entry::WriteEntry;
