//! Entry Stamping Tests
//!
//! Tests for the sequencing contract of a single WAL entry:
//! - Stamping is exactly once; a resubmitted entry keeps its id
//! - Memstore edits carry the id in every cell
//! - Replayed edits keep their original cell ids
//! - The affected-family set is deduplicated and skips the meta family
//! - Pre-assigned write handles bypass allocation

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use aerowal::mvcc::{Mvcc, MvccAllocator, SequenceId, WriteEntry};
use aerowal::wal::{
    Cell, PendingEntry, RegionInfo, SequenceError, SequenceResult, SequenceSource, TableName,
    Unstamped, WalEdit, WalEntry, WalKey, METAFAMILY,
};

// =============================================================================
// Test Utilities
// =============================================================================

/// Allocator issuing consecutive numbers from a chosen start, counting calls.
struct FakeAllocator {
    next: Mutex<i64>,
    begins: AtomicUsize,
}

impl FakeAllocator {
    fn starting_at(next: i64) -> Self {
        Self {
            next: Mutex::new(next),
            begins: AtomicUsize::new(0),
        }
    }

    fn begins(&self) -> usize {
        self.begins.load(Ordering::SeqCst)
    }
}

impl MvccAllocator for FakeAllocator {
    fn begin(&self) -> SequenceResult<WriteEntry> {
        self.begins.fetch_add(1, Ordering::SeqCst);
        let mut next = self.next.lock().unwrap();
        let write_entry = WriteEntry::new(*next);
        *next += 1;
        Ok(write_entry)
    }

    fn complete(&self, _write_entry: &WriteEntry) -> bool {
        true
    }
}

fn test_region() -> Arc<RegionInfo> {
    Arc::new(RegionInfo::with_region_id(TableName::new("orders"), "", "", 1_000))
}

fn cells(families: &[&[u8]]) -> WalEdit {
    WalEdit::from_cells(
        families
            .iter()
            .enumerate()
            .map(|(i, family)| Cell::new(format!("row{}", i), *family, "q", 1, "value"))
            .collect(),
    )
}

fn new_entry(txid: u64, edit: WalEdit, in_memstore: bool) -> WalEntry<Unstamped> {
    let region = test_region();
    WalEntry::new(txid, WalKey::new(&region), edit, region, in_memstore)
}

// =============================================================================
// Affected-Family Set
// =============================================================================

/// Families {A, B, A, META} collapse to {A, B}.
#[test]
fn test_family_set_dedups_and_excludes_meta() {
    let entry = new_entry(1, cells(&[b"A", b"B", b"A", METAFAMILY]), true);
    let families = entry.family_names();

    assert_eq!(families.len(), 2);
    assert!(families.contains(b"B"));
    assert!(families.contains(b"A"));
    assert!(!families.contains(METAFAMILY));
}

/// Cells [cf1, cf1, meta] give {cf1}.
#[test]
fn test_family_set_single_family() {
    let entry = new_entry(1, cells(&[b"cf1", b"cf1", METAFAMILY]), true);
    let names: Vec<&[u8]> = entry.family_names().iter().map(|f| f.as_bytes()).collect();
    assert_eq!(names, vec![&b"cf1"[..]]);
}

/// WAL-only edits never report families.
#[test]
fn test_family_set_empty_when_not_in_memstore() {
    let entry = new_entry(1, cells(&[b"cf1", b"cf2"]), false);
    assert!(entry.family_names().is_empty());
}

/// The set is shareable across threads after construction.
#[test]
fn test_family_set_shared_read() {
    let entry = new_entry(1, cells(&[b"a", b"b"]), true);
    let families = entry.family_names().clone();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let families = families.clone();
            std::thread::spawn(move || families.contains(b"a") && families.contains(b"b"))
        })
        .collect();
    for handle in handles {
        assert!(handle.join().unwrap());
    }
}

// =============================================================================
// Stamping
// =============================================================================

/// Allocator issuing 42: id 42, all cells 42, key holds the new handle.
#[test]
fn test_stamp_allocates_and_backfills() {
    let allocator = FakeAllocator::starting_at(42);
    let stamped = new_entry(1, cells(&[b"cf1", b"cf2", b"cf1"]), true)
        .stamp_region_sequence_id(Some(&allocator))
        .unwrap();

    assert_eq!(stamped.sequence_id(), SequenceId::new(42));
    for cell in stamped.edit().cells() {
        assert_eq!(cell.sequence_id(), SequenceId::new(42));
    }
    let recorded = stamped.key().write_entry().expect("handle recorded on key");
    assert_eq!(recorded.write_number(), 42);
    assert_eq!(stamped.key().sequence_id(), SequenceId::new(42));
}

/// Stamping twice yields the same id and allocates once.
#[test]
fn test_stamp_is_idempotent() {
    let allocator = FakeAllocator::starting_at(10);
    let first = PendingEntry::from(new_entry(1, cells(&[b"cf"]), true))
        .stamp_region_sequence_id(Some(&allocator))
        .unwrap();
    let first_id = first.sequence_id();

    let second = PendingEntry::from(first)
        .stamp_region_sequence_id(Some(&allocator))
        .unwrap();

    assert_eq!(second.sequence_id(), first_id);
    assert_eq!(second.stamp_region_sequence_id(), first_id);
    assert_eq!(second.edit().cells()[0].sequence_id(), first_id);
    assert_eq!(allocator.begins(), 1);
}

/// Replayed cells keep their ids whether or not the edit is memstore-bound.
#[test]
fn test_replay_never_restamped() {
    for in_memstore in [true, false] {
        let mut edit = WalEdit::replay();
        edit.add(Cell::new("r1", "cf", "q", 1, "v").with_sequence_id(SequenceId::new(3)));
        edit.add(Cell::new("r2", "cf", "q", 1, "v").with_sequence_id(SequenceId::new(4)));

        let stamped = new_entry(1, edit, in_memstore)
            .stamp_region_sequence_id(Some(&Mvcc::new(100)))
            .unwrap();

        assert_eq!(stamped.sequence_id(), SequenceId::new(101));
        let ids: Vec<SequenceId> = stamped.edit().cells().iter().map(Cell::sequence_id).collect();
        assert_eq!(ids, vec![SequenceId::new(3), SequenceId::new(4)]);
    }
}

/// A pre-assigned handle is used as is; the allocator is never called.
#[test]
fn test_pre_assigned_handle_skips_allocation() {
    let allocator = FakeAllocator::starting_at(500);
    let region = test_region();
    let key = WalKey::new(&region).with_pre_assigned_write_entry(WriteEntry::new(64));

    let stamped = WalEntry::new(1, key, cells(&[b"cf"]), region, true)
        .stamp_region_sequence_id(Some(&allocator))
        .unwrap();

    assert_eq!(stamped.sequence_id(), SequenceId::new(64));
    assert_eq!(stamped.sequence_source(), SequenceSource::PreAssigned);
    assert_eq!(stamped.edit().cells()[0].sequence_id(), SequenceId::new(64));
    assert_eq!(allocator.begins(), 0);
}

/// No allocator and no handle: the sentinel id, cells get the sentinel.
#[test]
fn test_no_allocator_yields_sentinel() {
    let stamped = new_entry(1, cells(&[b"cf"]), true)
        .stamp_region_sequence_id(None)
        .unwrap();
    assert_eq!(stamped.sequence_id(), SequenceId::NONE);
    assert!(!stamped.sequence_id().is_assigned());
    assert!(stamped.key().write_entry().is_none());
}

/// E1 then E2 on one allocator: id(E1) < id(E2).
#[test]
fn test_shared_allocator_is_monotonic() {
    let mvcc = Mvcc::default();
    let mut previous = SequenceId::NONE;
    for txid in 1..=10 {
        let stamped = new_entry(txid, cells(&[b"cf"]), true)
            .stamp_region_sequence_id(Some(&mvcc))
            .unwrap();
        assert!(stamped.sequence_id() > previous);
        previous = stamped.sequence_id();
    }
}

// =============================================================================
// Failure Propagation
// =============================================================================

struct ClosedAllocator;

impl MvccAllocator for ClosedAllocator {
    fn begin(&self) -> SequenceResult<WriteEntry> {
        Err(SequenceError::AllocationFailed("mvcc closed".to_string()))
    }

    fn complete(&self, _write_entry: &WriteEntry) -> bool {
        false
    }
}

/// Allocator errors come back unchanged, with no partial stamping.
#[test]
fn test_allocator_error_propagates_unchanged() {
    let err = new_entry(7, cells(&[b"cf", b"cf"]), true)
        .stamp_region_sequence_id(Some(&ClosedAllocator))
        .unwrap_err();

    assert_eq!(err.source, SequenceError::AllocationFailed("mvcc closed".to_string()));
    assert!(err.source.is_fatal());
    assert!(err
        .entry
        .edit()
        .cells()
        .iter()
        .all(|c| c.sequence_id() == SequenceId::NONE));
    assert_eq!(err.entry.key().sequence_id(), SequenceId::NONE);
}

// =============================================================================
// Visibility
// =============================================================================

/// The recorded handle is what makes the edit visible.
#[test]
fn test_recorded_handle_completes_on_mvcc() {
    let mvcc = Mvcc::default();
    let stamped = new_entry(1, cells(&[b"cf"]), true)
        .stamp_region_sequence_id(Some(&mvcc))
        .unwrap();
    assert_eq!(mvcc.read_point(), 0);

    let handle = stamped.write_entry().unwrap();
    assert!(mvcc.complete_write(handle));
    assert_eq!(mvcc.read_point(), stamped.sequence_id().value());
}

/// Trace string leads with the transaction id.
#[test]
fn test_trace_string() {
    let entry = new_entry(31, cells(&[b"cf"]), true);
    let text = entry.to_string();
    assert!(text.starts_with("sequence=31, orders/"));
    assert!(text.contains("#edits: 1"));
}
