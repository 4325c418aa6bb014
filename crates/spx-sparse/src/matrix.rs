//! Row-major sparse matrix storage.
//!
//! A [`SparseMatrix`] owns one [`SparseRow`] per matrix row plus two lazily
//! built access paths:
//!
//! - column chains (see [`crate::access`]) for column-wise traversal
//! - cached diagonal indices in each row
//!
//! Any call that changes a row's pattern clears both; they are rebuilt on the
//! next request and never observed stale.

use spx_core::{EngineConfig, GrowthPolicy};
use tracing::debug;

use crate::access::ColumnChains;
use crate::error::{filled, reserve_to, SparseError, SparseResult};
use crate::row::{ColumnSlot, SparseRow};

/// Sparse matrix stored as sorted rows.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    pub(crate) rows: Vec<SparseRow>,
    pub(crate) n_cols: usize,
    /// Largest column count this matrix has had; chain arrays are sized to it.
    pub(crate) max_cols: usize,
    /// Initial capacity for rows added by `resize`.
    pub(crate) row_reserve: usize,
    pub(crate) growth: GrowthPolicy,
    pub(crate) columns: Option<ColumnChains>,
    pub(crate) diag_access: bool,
}

impl PartialEq for SparseMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.n_cols == other.n_cols && self.rows == other.rows
    }
}

impl SparseMatrix {
    /// Create an `n_rows x n_cols` matrix with room for about `avg_nnz`
    /// entries per row.
    pub fn new(n_rows: usize, n_cols: usize, avg_nnz: usize) -> SparseResult<Self> {
        Self::with_growth(n_rows, n_cols, avg_nnz, GrowthPolicy::default())
    }

    /// Create a matrix using the engine configuration's defaults.
    pub fn with_config(n_rows: usize, n_cols: usize, config: &EngineConfig) -> SparseResult<Self> {
        Self::with_growth(n_rows, n_cols, config.default_avg_nnz, config.growth)
    }

    pub fn with_growth(
        n_rows: usize,
        n_cols: usize,
        avg_nnz: usize,
        growth: GrowthPolicy,
    ) -> SparseResult<Self> {
        let mut rows = Vec::new();
        reserve_to(&mut rows, n_rows)?;
        for _ in 0..n_rows {
            rows.push(SparseRow::with_capacity(avg_nnz)?);
        }
        debug!(n_rows, n_cols, avg_nnz, "allocated sparse matrix");
        Ok(Self {
            rows,
            n_cols,
            max_cols: n_cols,
            row_reserve: avg_nnz,
            growth,
            columns: None,
            diag_access: false,
        })
    }

    /// Build from `(row, col, value)` triplets, summing duplicates.
    pub fn from_triplets<I>(n_rows: usize, n_cols: usize, triplets: I) -> SparseResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut per_row: Vec<Vec<(usize, f64)>> = filled(n_rows, Vec::new())?;
        for (i, j, v) in triplets {
            if i >= n_rows || j >= n_cols {
                return Err(SparseError::IndexOutOfBounds {
                    row: i,
                    col: j,
                    rows: n_rows,
                    cols: n_cols,
                });
            }
            per_row[i].push((j, v));
        }
        let mut matrix = Self::new(0, n_cols, 0)?;
        matrix.rows = per_row.into_iter().map(SparseRow::from_pairs).collect();
        Ok(matrix)
    }

    /// Assemble a matrix from prepared rows. Rows must be sorted and hold no
    /// column `>= n_cols`.
    pub(crate) fn from_rows(rows: Vec<SparseRow>, n_cols: usize, growth: GrowthPolicy) -> Self {
        Self {
            rows,
            n_cols,
            max_cols: n_cols,
            row_reserve: 0,
            growth,
            columns: None,
            diag_access: false,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.n_cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.n_cols)
    }

    /// Number of row slots allocated.
    pub fn max_rows(&self) -> usize {
        self.rows.capacity()
    }

    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    /// Stored entries, explicit zeros included.
    pub fn nnz(&self) -> usize {
        self.rows.iter().map(SparseRow::len).sum()
    }

    pub fn growth(&self) -> GrowthPolicy {
        self.growth
    }

    pub fn set_growth(&mut self, growth: GrowthPolicy) {
        self.growth = growth;
    }

    pub fn row(&self, i: usize) -> Option<&SparseRow> {
        self.rows.get(i)
    }

    /// Stored entries in row `i`; `0` for rows outside the matrix.
    pub fn row_len(&self, i: usize) -> usize {
        self.rows.get(i).map_or(0, SparseRow::len)
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &SparseRow> + '_ {
        self.rows.iter()
    }

    /// Iterate over all stored `(row, col, value)` triplets in row order.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.rows
            .iter()
            .enumerate()
            .flat_map(|(i, row)| row.iter().map(move |(j, v)| (i, j, v)))
    }

    pub(crate) fn check_index(&self, i: usize, j: usize) -> SparseResult<()> {
        if i >= self.rows.len() || j >= self.n_cols {
            return Err(SparseError::IndexOutOfBounds {
                row: i,
                col: j,
                rows: self.rows.len(),
                cols: self.n_cols,
            });
        }
        Ok(())
    }

    /// Locate entry `(i, j)`.
    pub fn locate(&self, i: usize, j: usize) -> ColumnSlot {
        if self.check_index(i, j).is_err() {
            return ColumnSlot::OutOfBounds;
        }
        self.rows[i].find_column(j)
    }

    /// Value at `(i, j)`; `0.0` when not stored.
    pub fn get(&self, i: usize, j: usize) -> SparseResult<f64> {
        self.check_index(i, j)?;
        Ok(self.rows[i].get(j))
    }

    /// Store `val` at `(i, j)`. Storing `0.0` keeps the entry in the pattern.
    pub fn set(&mut self, i: usize, j: usize, val: f64) -> SparseResult<()> {
        self.check_index(i, j)?;
        self.rows[i].set(j, val, self.growth)?;
        self.invalidate_access();
        Ok(())
    }

    /// Remove `(i, j)` from the pattern, returning the old value.
    pub fn remove(&mut self, i: usize, j: usize) -> SparseResult<Option<f64>> {
        self.check_index(i, j)?;
        let removed = self.rows[i].remove(j);
        if removed.is_some() {
            self.invalidate_access();
        }
        Ok(removed)
    }

    /// Run `f` on row `i` with mutable access, then invalidate access paths.
    ///
    /// Entries the closure leaves at columns `>= cols()` are dropped and
    /// reported as an index error.
    pub fn update_row<F, T>(&mut self, i: usize, f: F) -> SparseResult<T>
    where
        F: FnOnce(&mut SparseRow) -> T,
    {
        let n_rows = self.rows.len();
        let n_cols = self.n_cols;
        let row = self.rows.get_mut(i).ok_or(SparseError::IndexOutOfBounds {
            row: i,
            col: 0,
            rows: n_rows,
            cols: n_cols,
        })?;
        let out = f(row);
        let overflow = row.last_col().filter(|&c| c >= n_cols);
        if overflow.is_some() {
            row.truncate_columns(n_cols);
        }
        self.invalidate_access();
        match overflow {
            Some(col) => Err(SparseError::IndexOutOfBounds {
                row: i,
                col,
                rows: n_rows,
                cols: n_cols,
            }),
            None => Ok(out),
        }
    }

    pub(crate) fn invalidate_access(&mut self) {
        self.columns = None;
        self.diag_access = false;
    }

    /// Change the shape. Rows past `n_rows` are freed, new rows start empty,
    /// and entries with column `>= n_cols` are dropped (columns are never
    /// renumbered).
    pub fn resize(&mut self, n_rows: usize, n_cols: usize) -> SparseResult<()> {
        let old = self.shape();
        if n_rows < self.rows.len() {
            self.rows.truncate(n_rows);
        } else if n_rows > self.rows.len() {
            reserve_to(&mut self.rows, n_rows)?;
            while self.rows.len() < n_rows {
                self.rows.push(SparseRow::with_capacity(self.row_reserve)?);
            }
        }

        let mut dropped = 0;
        if n_cols < self.n_cols {
            for row in &mut self.rows {
                dropped += row.truncate_columns(n_cols);
            }
        }
        self.n_cols = n_cols;
        self.max_cols = self.max_cols.max(n_cols);
        self.invalidate_access();
        debug!(?old, new = ?(n_rows, n_cols), dropped, "resized sparse matrix");
        Ok(())
    }

    /// Drop entries with `|value| <= threshold` and shrink every row to its
    /// length. Returns the number of entries removed.
    pub fn compact(&mut self, threshold: f64) -> usize {
        let removed: usize = self.rows.iter_mut().map(|row| row.compact(threshold)).sum();
        self.invalidate_access();
        debug!(threshold, removed, nnz = self.nnz(), "compacted sparse matrix");
        removed
    }

    /// [`SparseMatrix::compact`] at the configured threshold.
    pub fn compact_with(&mut self, config: &EngineConfig) -> usize {
        self.compact(config.compact_threshold)
    }

    /// Set every stored value to zero, keeping the pattern and access paths.
    pub fn zero(&mut self) {
        for row in &mut self.rows {
            row.zero_values();
        }
    }

    /// Copy shape and entries into `out`, reusing its row storage.
    pub fn copy_into(&self, out: &mut SparseMatrix) -> SparseResult<()> {
        out.resize(self.rows.len(), self.n_cols)?;
        for (src, dst) in self.rows.iter().zip(out.rows.iter_mut()) {
            dst.replace_tail(0, src.entries(), out.growth)?;
        }
        out.invalidate_access();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_matrix_shape() {
        let a = SparseMatrix::new(3, 4, 5).unwrap();
        assert_eq!(a.shape(), (3, 4));
        assert_eq!(a.nnz(), 0);
        assert!(a.max_rows() >= 3);
        assert!(a.row(0).unwrap().capacity() >= 5);
        assert!(!a.has_column_access());
        assert!(!a.has_diag_access());
    }

    #[test]
    fn test_get_set() {
        let mut a = SparseMatrix::new(3, 3, 2).unwrap();
        a.set(0, 2, 5.0).unwrap();
        a.set(0, 0, 1.0).unwrap();
        assert_eq!(a.get(0, 2).unwrap(), 5.0);
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
        assert_eq!(a.row_len(0), 2);
        assert!(a.row(0).unwrap().is_sorted());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut a = SparseMatrix::new(2, 2, 1).unwrap();
        assert!(matches!(
            a.get(2, 0),
            Err(SparseError::IndexOutOfBounds { row: 2, .. })
        ));
        assert!(matches!(
            a.set(0, 2, 1.0),
            Err(SparseError::IndexOutOfBounds { col: 2, .. })
        ));
        assert_eq!(a.locate(0, 5), ColumnSlot::OutOfBounds);
        assert_eq!(a.nnz(), 0);
    }

    #[test]
    fn test_set_invalidates_access() {
        let mut a = SparseMatrix::new(2, 2, 1).unwrap();
        a.set(0, 0, 1.0).unwrap();
        a.build_column_access().unwrap();
        a.build_diag_access();
        assert!(a.has_column_access());
        assert!(a.has_diag_access());

        a.set(1, 0, 2.0).unwrap();
        assert!(!a.has_column_access());
        assert!(!a.has_diag_access());
    }

    #[test]
    fn test_from_triplets_sums_duplicates() {
        let a = SparseMatrix::from_triplets(2, 2, [(0, 1, 1.0), (0, 1, 2.0), (1, 0, 4.0)]).unwrap();
        assert_eq!(a.get(0, 1).unwrap(), 3.0);
        assert_eq!(a.nnz(), 2);
        assert!(SparseMatrix::from_triplets(2, 2, [(2, 0, 1.0)]).is_err());
    }

    #[test]
    fn test_from_triplets_allocation_failure() {
        assert!(matches!(
            SparseMatrix::from_triplets(usize::MAX, 1, std::iter::empty()),
            Err(SparseError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_compact_keeps_nan() {
        let mut a = SparseMatrix::from_triplets(1, 3, [(0, 0, f64::NAN), (0, 1, 1.0)]).unwrap();
        assert_eq!(a.compact(0.5), 0);
        assert_eq!(a.nnz(), 2);

        let mut b = SparseMatrix::from_triplets(1, 3, [(0, 0, 2.0), (0, 1, 1.0)]).unwrap();
        assert_eq!(b.compact(f64::NAN), 0);
        assert_eq!(b.nnz(), 2);
    }

    #[test]
    fn test_resize_drops_out_of_range_columns() {
        let mut a = SparseMatrix::from_triplets(3, 3, [(0, 0, 1.0), (0, 2, 5.0)]).unwrap();
        a.resize(3, 2).unwrap();
        assert_eq!(a.shape(), (3, 2));
        assert_eq!(a.row(0).unwrap().iter().collect::<Vec<_>>(), vec![(0, 1.0)]);
        assert_eq!(a.max_cols(), 3);
    }

    #[test]
    fn test_resize_rows() {
        let mut a = SparseMatrix::from_triplets(3, 3, [(2, 2, 3.0), (0, 0, 1.0)]).unwrap();
        a.resize(2, 3).unwrap();
        assert_eq!(a.rows(), 2);
        assert_eq!(a.nnz(), 1);

        a.resize(5, 4).unwrap();
        assert_eq!(a.shape(), (5, 4));
        assert_eq!(a.row_len(4), 0);
        a.set(4, 3, 1.0).unwrap();
        assert_eq!(a.get(4, 3).unwrap(), 1.0);
    }

    #[test]
    fn test_compact_is_idempotent() {
        let mut a = SparseMatrix::from_triplets(
            2,
            3,
            [(0, 0, 1e-10), (0, 1, 1.0), (1, 2, 0.0), (1, 0, -3.0)],
        )
        .unwrap();
        assert_eq!(a.compact(1e-8), 2);
        let once = a.clone();
        assert_eq!(a.compact(1e-8), 0);
        assert_eq!(a, once);
        for row in a.iter_rows() {
            assert!(row.capacity() >= row.len());
        }
    }

    #[test]
    fn test_zero_keeps_pattern() {
        let mut a = SparseMatrix::from_triplets(2, 2, [(0, 0, 1.0), (1, 1, 2.0)]).unwrap();
        a.zero();
        assert_eq!(a.nnz(), 2);
        assert_eq!(a.get(1, 1).unwrap(), 0.0);
    }

    #[test]
    fn test_copy_into_reuses_destination() {
        let a = SparseMatrix::from_triplets(2, 3, [(0, 2, 1.0), (1, 0, 2.0)]).unwrap();
        let mut b = SparseMatrix::from_triplets(4, 4, [(3, 3, 9.0), (0, 0, 9.0)]).unwrap();
        a.copy_into(&mut b).unwrap();
        assert_eq!(b, a);
    }

    #[test]
    fn test_update_row_rejects_out_of_range_columns() {
        let mut a = SparseMatrix::new(2, 3, 2).unwrap();
        let growth = a.growth();
        let err = a
            .update_row(0, |row| {
                row.set(1, 1.0, growth).unwrap();
                row.set(7, 1.0, growth).unwrap();
            })
            .unwrap_err();
        assert!(matches!(err, SparseError::IndexOutOfBounds { col: 7, .. }));
        assert_eq!(a.row_len(0), 1);
    }
}
