//! WalEdit - The ordered cell batch a WAL entry carries
//!
//! Also defines the column family identity used for per-family
//! bookkeeping and the reserved meta family that marker edits are
//! written under.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use super::cell::Cell;

/// Reserved family for WAL-only marker cells (compaction, flush, region
/// events). Never counted as a user family.
pub const METAFAMILY: &[u8] = b"METAFAMILY";

/// Compare two byte strings as unsigned bytes, shorter prefix first.
pub fn compare_bytes(left: &[u8], right: &[u8]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        match l.cmp(r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    left.len().cmp(&right.len())
}

/// A column family name, ordered by raw unsigned byte comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Family(Box<[u8]>);

impl Family {
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self(name.into().into_boxed_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Ord for Family {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_bytes(&self.0, &other.0)
    }
}

impl PartialOrd for Family {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// compare_bytes agrees with slice ordering, so lookups by &[u8] are sound.
impl Borrow<[u8]> for Family {
    fn borrow(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

/// Immutable, cheaply shareable set of families touched by an edit.
///
/// Clones share the same allocation, so index builders and accounting
/// can hold it across threads without copying.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyNames(Arc<BTreeSet<Family>>);

impl FamilyNames {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collect the distinct non-meta families of `cells`.
    pub fn from_cells<'a>(cells: impl IntoIterator<Item = &'a Cell>) -> Self {
        let families: BTreeSet<Family> = cells
            .into_iter()
            .filter(|cell| !cell.matches_family(METAFAMILY))
            .map(|cell| Family::new(cell.family()))
            .collect();
        Self(Arc::new(families))
    }

    pub fn contains(&self, family: &[u8]) -> bool {
        self.0.contains(family)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Families in byte order.
    pub fn iter(&self) -> impl Iterator<Item = &Family> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FamilyNames {
    type Item = &'a Family;
    type IntoIter = std::collections::btree_set::Iter<'a, Family>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Ordered cells of one logical mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalEdit {
    cells: Vec<Cell>,
    /// Set when re-applying an edit that is already durable elsewhere;
    /// its cells keep the sequence ids they arrived with.
    replay: bool,
}

impl WalEdit {
    pub fn new() -> Self {
        Self::default()
    }

    /// An edit being replayed from an already durable log.
    pub fn replay() -> Self {
        Self {
            cells: Vec::new(),
            replay: true,
        }
    }

    pub fn from_cells(cells: Vec<Cell>) -> Self {
        Self {
            cells,
            replay: false,
        }
    }

    /// Append a cell, keeping insertion order.
    pub fn add(&mut self, cell: Cell) -> &mut Self {
        self.cells.push(cell);
        self
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the edit is a marker written under the meta family only.
    pub fn is_meta_edit(&self) -> bool {
        !self.cells.is_empty() && self.cells.iter().all(|c| c.matches_family(METAFAMILY))
    }
}

impl fmt::Display for WalEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[#edits: {} = <", self.cells.len())?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", cell)?;
        }
        write!(f, ">]")
    }
}
