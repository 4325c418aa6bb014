//! Sparse rows.
//!
//! A [`SparseRow`] is an ordered list of `(column, value)` entries with
//! strictly increasing columns. Capacity may exceed length; the slack is kept
//! so repeated inserts do not reallocate every time.
//!
//! Pattern membership is independent of the stored value: setting an entry to
//! `0.0` keeps it in the row. Only [`SparseRow::compact`] (or an explicit
//! [`SparseRow::remove`]) takes entries out of the pattern.

use spx_core::GrowthPolicy;

use crate::error::{reserve_to, SparseResult};

/// One stored entry of a sparse row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowEntry {
    pub col: usize,
    pub val: f64,
}

impl RowEntry {
    pub fn new(col: usize, val: f64) -> Self {
        Self { col, val }
    }
}

/// Outcome of looking up a column.
///
/// `InsertAt` carries the index at which the column would have to be inserted
/// to keep the row sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSlot {
    Found(usize),
    InsertAt(usize),
    OutOfBounds,
}

impl ColumnSlot {
    /// Integer form: `idx` when found, `-(idx + 2)` for an insertion point,
    /// `-1` for out of bounds.
    pub fn encode(self) -> isize {
        match self {
            ColumnSlot::Found(idx) => idx as isize,
            ColumnSlot::InsertAt(idx) => -(idx as isize) - 2,
            ColumnSlot::OutOfBounds => -1,
        }
    }

    /// Inverse of [`ColumnSlot::encode`].
    pub fn decode(raw: isize) -> Self {
        match raw {
            -1 => ColumnSlot::OutOfBounds,
            r if r >= 0 => ColumnSlot::Found(r as usize),
            r => ColumnSlot::InsertAt((-(r + 2)) as usize),
        }
    }

    /// Index of the entry, if the column is present.
    pub fn found(self) -> Option<usize> {
        match self {
            ColumnSlot::Found(idx) => Some(idx),
            _ => None,
        }
    }

    /// Index of the entry or of its insertion point; `None` when out of bounds.
    pub fn position(self) -> Option<usize> {
        match self {
            ColumnSlot::Found(idx) | ColumnSlot::InsertAt(idx) => Some(idx),
            ColumnSlot::OutOfBounds => None,
        }
    }
}

/// One matrix row stored as sorted `(column, value)` entries.
#[derive(Debug, Clone, Default)]
pub struct SparseRow {
    entries: Vec<RowEntry>,
    /// Cached index of the diagonal entry. Only meaningful while the owning
    /// matrix reports diagonal access.
    diag: Option<usize>,
}

impl PartialEq for SparseRow {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl SparseRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty row with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> SparseResult<Self> {
        let mut entries = Vec::new();
        reserve_to(&mut entries, capacity)?;
        Ok(Self {
            entries,
            diag: None,
        })
    }

    /// Build a row from unordered `(column, value)` pairs; duplicate columns
    /// are summed.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<RowEntry> = pairs
            .into_iter()
            .map(|(col, val)| RowEntry::new(col, val))
            .collect();
        entries.sort_by_key(|e| e.col);
        entries.dedup_by(|next, kept| {
            if next.col == kept.col {
                kept.val += next.val;
                true
            } else {
                false
            }
        });
        Self {
            entries,
            diag: None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    pub fn entries(&self) -> &[RowEntry] {
        &self.entries
    }

    /// Iterate over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|e| (e.col, e.val))
    }

    /// Largest stored column, if any.
    pub fn last_col(&self) -> Option<usize> {
        self.entries.last().map(|e| e.col)
    }

    /// True if columns are strictly increasing.
    pub fn is_sorted(&self) -> bool {
        self.entries.windows(2).all(|w| w[0].col < w[1].col)
    }

    /// Locate `col` by binary search.
    ///
    /// Rows carry no column bound of their own, so this never returns
    /// [`ColumnSlot::OutOfBounds`]; the matrix-level lookup does.
    pub fn find_column(&self, col: usize) -> ColumnSlot {
        match self.entries.binary_search_by_key(&col, |e| e.col) {
            Ok(idx) => ColumnSlot::Found(idx),
            Err(idx) => ColumnSlot::InsertAt(idx),
        }
    }

    /// Value at `col`, or `0.0` if the column is not stored.
    pub fn get(&self, col: usize) -> f64 {
        match self.find_column(col) {
            ColumnSlot::Found(idx) => self.entries[idx].val,
            _ => 0.0,
        }
    }

    /// Store `val` at `col`, inserting the column if needed.
    ///
    /// On allocation failure the row is left unchanged.
    pub fn set(&mut self, col: usize, val: f64, growth: GrowthPolicy) -> SparseResult<()> {
        let idx = match self.find_column(col) {
            ColumnSlot::Found(idx) => {
                self.entries[idx].val = val;
                return Ok(());
            }
            ColumnSlot::InsertAt(idx) => idx,
            ColumnSlot::OutOfBounds => self.len(),
        };
        if self.len() == self.capacity() {
            self.expand_capacity(self.len() + 1, growth)?;
        }
        self.entries.insert(idx, RowEntry::new(col, val));
        if let Some(d) = self.diag {
            if idx <= d {
                self.diag = Some(d + 1);
            }
        }
        Ok(())
    }

    /// Make room for at least `min_len` entries, preserving contents.
    pub fn expand_capacity(&mut self, min_len: usize, growth: GrowthPolicy) -> SparseResult<()> {
        if self.capacity() >= min_len {
            return Ok(());
        }
        let target = growth.next_capacity(self.len(), min_len);
        reserve_to(&mut self.entries, target)
    }

    /// Remove `col` from the pattern, returning its value. Capacity is kept.
    pub fn remove(&mut self, col: usize) -> Option<f64> {
        let idx = self.find_column(col).found()?;
        let entry = self.entries.remove(idx);
        self.diag = match self.diag {
            Some(d) if d == idx => None,
            Some(d) if d > idx => Some(d - 1),
            other => other,
        };
        Some(entry.val)
    }

    /// Drop every entry with column `>= n_cols`; returns how many went.
    pub fn truncate_columns(&mut self, n_cols: usize) -> usize {
        let keep = self.find_column(n_cols).position().unwrap_or(self.len());
        let removed = self.len() - keep;
        self.entries.truncate(keep);
        if matches!(self.diag, Some(d) if d >= keep) {
            self.diag = None;
        }
        removed
    }

    /// Drop entries with `|value| <= threshold` and release slack capacity.
    ///
    /// NaN never compares, so NaN entries are kept and a NaN threshold
    /// removes nothing.
    pub fn compact(&mut self, threshold: f64) -> usize {
        let before = self.len();
        self.entries.retain(|e| !negligible(e.val, threshold));
        self.entries.shrink_to_fit();
        self.diag = None;
        before - self.len()
    }

    /// Set every stored value to zero, keeping the pattern.
    pub fn zero_values(&mut self) {
        for e in &mut self.entries {
            e.val = 0.0;
        }
    }

    /// Replace everything from entry `start` onwards with `tail`.
    pub(crate) fn replace_tail(
        &mut self,
        start: usize,
        tail: &[RowEntry],
        growth: GrowthPolicy,
    ) -> SparseResult<()> {
        let start = start.min(self.len());
        self.expand_capacity(start + tail.len(), growth)?;
        self.entries.truncate(start);
        self.entries.extend_from_slice(tail);
        if matches!(self.diag, Some(d) if d >= start) {
            self.diag = None;
        }
        Ok(())
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [RowEntry] {
        &mut self.entries
    }

    pub(crate) fn cached_diag(&self) -> Option<usize> {
        self.diag
    }

    pub(crate) fn set_cached_diag(&mut self, diag: Option<usize>) {
        self.diag = diag;
    }
}

fn negligible(val: f64, threshold: f64) -> bool {
    val.abs() <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(usize, f64)]) -> SparseRow {
        SparseRow::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_find_column_insertion_point() {
        let r = row(&[(1, 1.0), (3, 3.0), (5, 5.0)]);
        let slot = r.find_column(4);
        assert_eq!(slot, ColumnSlot::InsertAt(2));
        assert_eq!(slot.encode(), -4);
        assert!(slot.encode() < -1);
        assert_eq!(ColumnSlot::decode(slot.encode()).position(), Some(2));
        assert_eq!(r.find_column(3), ColumnSlot::Found(1));
        assert_eq!(r.find_column(0), ColumnSlot::InsertAt(0));
        assert_eq!(r.find_column(9), ColumnSlot::InsertAt(3));
    }

    #[test]
    fn test_slot_encoding_roundtrip() {
        for slot in [
            ColumnSlot::Found(0),
            ColumnSlot::Found(7),
            ColumnSlot::InsertAt(0),
            ColumnSlot::InsertAt(7),
            ColumnSlot::OutOfBounds,
        ] {
            assert_eq!(ColumnSlot::decode(slot.encode()), slot);
        }
        assert_eq!(ColumnSlot::OutOfBounds.encode(), -1);
        assert_eq!(ColumnSlot::OutOfBounds.position(), None);
    }

    #[test]
    fn test_set_keeps_columns_sorted() {
        let mut r = SparseRow::new();
        for col in [5, 1, 9, 3, 7, 0] {
            r.set(col, col as f64, GrowthPolicy::default()).unwrap();
            assert!(r.is_sorted());
        }
        let cols: Vec<usize> = r.iter().map(|(c, _)| c).collect();
        assert_eq!(cols, vec![0, 1, 3, 5, 7, 9]);
        assert_eq!(r.get(7), 7.0);
        assert_eq!(r.get(8), 0.0);
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut r = row(&[(2, 1.0)]);
        r.set(2, 4.0, GrowthPolicy::Exact).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.get(2), 4.0);
    }

    #[test]
    fn test_explicit_zero_is_retained() {
        let mut r = row(&[(2, 1.0)]);
        r.set(2, 0.0, GrowthPolicy::default()).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.find_column(2), ColumnSlot::Found(0));
        assert_eq!(r.get(2), 0.0);
    }

    #[test]
    fn test_growth_is_geometric() {
        let mut r = SparseRow::with_capacity(2).unwrap();
        let growth = GrowthPolicy::Geometric {
            factor: 2.0,
            min_len: 2,
        };
        r.set(0, 1.0, growth).unwrap();
        r.set(1, 1.0, growth).unwrap();
        assert!(r.capacity() >= 2);
        r.set(2, 1.0, growth).unwrap();
        // len 2 * 2 + 1
        assert!(r.capacity() >= 5);
    }

    #[test]
    fn test_expand_capacity_preserves_contents() {
        let mut r = row(&[(0, 1.0), (4, 2.0)]);
        r.expand_capacity(50, GrowthPolicy::Exact).unwrap();
        assert!(r.capacity() >= 50);
        assert_eq!(r, row(&[(0, 1.0), (4, 2.0)]));
    }

    #[test]
    fn test_from_pairs_sums_duplicates() {
        let r = row(&[(3, 1.0), (1, 2.0), (3, 0.5)]);
        assert_eq!(r.entries(), &[RowEntry::new(1, 2.0), RowEntry::new(3, 1.5)]);
    }

    #[test]
    fn test_remove_keeps_capacity() {
        let mut r = row(&[(0, 1.0), (1, 2.0), (2, 3.0)]);
        let cap = r.capacity();
        assert_eq!(r.remove(1), Some(2.0));
        assert_eq!(r.remove(1), None);
        assert_eq!(r.len(), 2);
        assert_eq!(r.capacity(), cap);
    }

    #[test]
    fn test_truncate_columns() {
        let mut r = row(&[(0, 1.0), (2, 5.0)]);
        assert_eq!(r.truncate_columns(2), 1);
        assert_eq!(r.entries(), &[RowEntry::new(0, 1.0)]);
    }

    #[test]
    fn test_compact_drops_small_entries() {
        let mut r = row(&[(0, 1e-12), (1, 2.0), (2, -1e-9), (3, 0.0)]);
        assert_eq!(r.compact(1e-8), 3);
        assert_eq!(r.entries(), &[RowEntry::new(1, 2.0)]);
        assert!(r.capacity() >= r.len());
        assert_eq!(r.compact(1e-8), 0);
    }

    #[test]
    fn test_diag_cache_tracks_inserts_and_removals() {
        let mut r = row(&[(1, 1.0), (4, 4.0)]);
        r.set_cached_diag(Some(1));
        r.set(0, 9.0, GrowthPolicy::default()).unwrap();
        assert_eq!(r.cached_diag(), Some(2));
        r.remove(0);
        assert_eq!(r.cached_diag(), Some(1));
        r.remove(4);
        assert_eq!(r.cached_diag(), None);
    }

    #[test]
    fn test_compact_with_nan() {
        let mut r = row(&[(0, f64::NAN), (1, 1.0)]);
        assert_eq!(r.compact(0.5), 0);
        assert_eq!(r.len(), 2);
        assert!(r.get(0).is_nan());

        let mut r = row(&[(0, 2.0), (1, 1.0)]);
        assert_eq!(r.compact(f64::NAN), 0);
        assert_eq!(r.len(), 2);
    }
}
