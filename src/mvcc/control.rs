//! In-memory multi-version concurrency control
//!
//! Tracks two points for one region:
//! - write point: the last write number handed out by `begin`
//! - read point: the highest write number below which every write has
//!   completed, i.e. what readers may see
//!
//! Writes complete in any order, but the read point only moves over a
//! contiguous completed prefix of the in-flight queue. A write completed
//! ahead of an older unfinished one stays invisible until the older one
//! completes too.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use super::{MvccAllocator, WriteEntry};
use crate::wal::SequenceResult;

/// Region-scoped MVCC with a FIFO queue of in-flight writes.
#[derive(Debug)]
pub struct Mvcc {
    /// Points and queue, all guarded together.
    inner: Mutex<MvccInner>,
    /// Signalled whenever the read point advances.
    read_point_advanced: Condvar,
}

#[derive(Debug)]
struct MvccInner {
    read_point: i64,
    write_point: i64,
    /// In-flight writes, oldest first.
    write_queue: VecDeque<WriteEntry>,
}

impl Mvcc {
    /// Create an MVCC whose read and write points both start at `start`.
    ///
    /// The first `begin` returns `start + 1`.
    pub fn new(start: i64) -> Self {
        Self {
            inner: Mutex::new(MvccInner {
                read_point: start,
                write_point: start,
                write_queue: VecDeque::new(),
            }),
            read_point_advanced: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MvccInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current read point.
    pub fn read_point(&self) -> i64 {
        self.lock().read_point
    }

    /// Last write number handed out.
    pub fn write_point(&self) -> i64 {
        self.lock().write_point
    }

    /// Number of writes begun but not yet made visible.
    pub fn in_flight(&self) -> usize {
        self.lock().write_queue.len()
    }

    /// Move both points forward to `new_start`, e.g. after replaying a
    /// region's edits on open.
    ///
    /// Returns false and leaves the points untouched when the write point
    /// is already at or past `new_start`, or when writes are in flight.
    pub fn advance_to(&self, new_start: i64) -> bool {
        let mut inner = self.lock();
        if inner.write_point >= new_start {
            return false;
        }
        if inner.read_point != inner.write_point || !inner.write_queue.is_empty() {
            return false;
        }
        inner.read_point = new_start;
        inner.write_point = new_start;
        drop(inner);
        self.read_point_advanced.notify_all();
        true
    }

    /// Allocate the next write number and enqueue it as in flight.
    pub fn begin_write(&self) -> WriteEntry {
        let mut inner = self.lock();
        inner.write_point += 1;
        let write_entry = WriteEntry::new(inner.write_point);
        inner.write_queue.push_back(write_entry.clone());
        write_entry
    }

    /// Mark `write_entry` complete and advance the read point over every
    /// completed write at the head of the queue.
    ///
    /// Returns whether `write_entry` is visible afterwards.
    pub fn complete_write(&self, write_entry: &WriteEntry) -> bool {
        let inner = self.complete_locked(write_entry);
        inner.read_point >= write_entry.write_number()
    }

    /// Complete `write_entry` and block until it is visible.
    pub fn complete_and_wait(&self, write_entry: &WriteEntry) {
        let mut inner = self.complete_locked(write_entry);
        while inner.read_point < write_entry.write_number() {
            inner = self
                .read_point_advanced
                .wait(inner)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn complete_locked(&self, write_entry: &WriteEntry) -> MutexGuard<'_, MvccInner> {
        let mut inner = self.lock();
        write_entry.mark_completed();

        let mut next_read_point = None;
        while let Some(head) = inner.write_queue.front() {
            if !head.is_completed() {
                break;
            }
            next_read_point = Some(head.write_number());
            inner.write_queue.pop_front();
        }

        if let Some(point) = next_read_point {
            inner.read_point = point;
            self.read_point_advanced.notify_all();
        }
        inner
    }
}

impl Default for Mvcc {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MvccAllocator for Mvcc {
    fn begin(&self) -> SequenceResult<WriteEntry> {
        Ok(self.begin_write())
    }

    fn complete(&self, write_entry: &WriteEntry) -> bool {
        self.complete_write(write_entry)
    }
}
