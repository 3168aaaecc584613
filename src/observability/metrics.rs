//! Sequencer counters
//!
//! - Counters only, monotonic
//! - Reset only when the sequencer is built
//! - Thread-safe; producers and the consumer may read concurrently

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for the sequencing path
///
/// All counters use Relaxed ordering; a snapshot is not a consistent cut
/// across counters, only each value is exact.
#[derive(Debug, Default)]
pub struct SequencerMetrics {
    /// Entries accepted onto the transport by producers
    entries_enqueued: AtomicU64,
    /// Fresh entries stamped (any sequence source)
    entries_stamped: AtomicU64,
    /// Write numbers requested from the allocator
    write_numbers_allocated: AtomicU64,
    /// Stampings satisfied by a pre-assigned write handle
    pre_assigned_used: AtomicU64,
    /// Resubmitted entries that skipped stamping
    restamps_skipped: AtomicU64,
    /// Cells that received a sequence id
    cells_stamped: AtomicU64,
    /// Replayed edits whose cells were left alone
    replay_entries: AtomicU64,
    /// Entries handed to the sink successfully
    entries_appended: AtomicU64,
    /// Entries refused by the sink
    sink_rejections: AtomicU64,
    /// Stampings aborted by the allocator
    allocation_failures: AtomicU64,
}

impl SequencerMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_enqueued(&self) {
        self.entries_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_stamped(&self) {
        self.entries_stamped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_allocated(&self) {
        self.write_numbers_allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pre_assigned(&self) {
        self.pre_assigned_used.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_restamps_skipped(&self) {
        self.restamps_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_cells_stamped(&self, cells: u64) {
        self.cells_stamped.fetch_add(cells, Ordering::Relaxed);
    }

    pub fn increment_replay(&self) {
        self.replay_entries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_appended(&self) {
        self.entries_appended.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_sink_rejections(&self) {
        self.sink_rejections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_allocation_failures(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_enqueued: self.entries_enqueued.load(Ordering::Relaxed),
            entries_stamped: self.entries_stamped.load(Ordering::Relaxed),
            write_numbers_allocated: self.write_numbers_allocated.load(Ordering::Relaxed),
            pre_assigned_used: self.pre_assigned_used.load(Ordering::Relaxed),
            restamps_skipped: self.restamps_skipped.load(Ordering::Relaxed),
            cells_stamped: self.cells_stamped.load(Ordering::Relaxed),
            replay_entries: self.replay_entries.load(Ordering::Relaxed),
            entries_appended: self.entries_appended.load(Ordering::Relaxed),
            sink_rejections: self.sink_rejections.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of the sequencer counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub entries_enqueued: u64,
    pub entries_stamped: u64,
    pub write_numbers_allocated: u64,
    pub pre_assigned_used: u64,
    pub restamps_skipped: u64,
    pub cells_stamped: u64,
    pub replay_entries: u64,
    pub entries_appended: u64,
    pub sink_rejections: u64,
    pub allocation_failures: u64,
}

impl MetricsSnapshot {
    /// Render as a single JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
