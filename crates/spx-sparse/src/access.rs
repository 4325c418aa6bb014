//! Column and diagonal access paths.
//!
//! Column chains thread a singly linked list through the row storage: the
//! head of column `j` names the first `(row, slot)` holding column `j`, and
//! each link names the next one further down. Links are plain indices, so
//! they survive row reallocation as long as the pattern does not change; any
//! pattern change drops the chains and the next request rebuilds them.

use tracing::{debug, trace};

use crate::error::{filled, reserve_to, SparseError, SparseResult};
use crate::matrix::SparseMatrix;
use crate::row::SparseRow;

/// Position of one entry in row storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainLink {
    pub row: usize,
    pub slot: usize,
}

/// Per-column linked traversal order, ascending by row.
#[derive(Debug, Clone, Default)]
pub struct ColumnChains {
    heads: Vec<Option<ChainLink>>,
    next: Vec<Vec<Option<ChainLink>>>,
}

impl ColumnChains {
    /// Link every stored entry into its column's chain in one pass over the
    /// rows.
    pub(crate) fn build(rows: &[SparseRow], n_cols: usize) -> SparseResult<Self> {
        let mut heads = filled(n_cols, None)?;
        let mut tails: Vec<Option<ChainLink>> = filled(n_cols, None)?;

        let mut next = Vec::new();
        reserve_to(&mut next, rows.len())?;
        for (i, row) in rows.iter().enumerate() {
            next.push(filled(row.len(), None)?);
            for (slot, entry) in row.entries().iter().enumerate() {
                let here = ChainLink { row: i, slot };
                let Some(tail) = tails.get_mut(entry.col) else {
                    return Err(SparseError::IndexOutOfBounds {
                        row: i,
                        col: entry.col,
                        rows: rows.len(),
                        cols: n_cols,
                    });
                };
                match tail.replace(here) {
                    Some(prev) => next[prev.row][prev.slot] = Some(here),
                    None => heads[entry.col] = Some(here),
                }
            }
        }
        Ok(Self { heads, next })
    }

    /// First entry of column `col`.
    pub fn head(&self, col: usize) -> Option<ChainLink> {
        self.heads.get(col).copied().flatten()
    }

    /// Entry following `link` in its column.
    pub fn next(&self, link: ChainLink) -> Option<ChainLink> {
        self.next
            .get(link.row)
            .and_then(|row| row.get(link.slot))
            .copied()
            .flatten()
    }

    pub fn n_cols(&self) -> usize {
        self.heads.len()
    }
}

/// Iterator over `(row, value)` pairs of one column.
pub struct ColumnIter<'a> {
    rows: &'a [SparseRow],
    chains: &'a ColumnChains,
    cursor: Option<ChainLink>,
}

impl<'a> ColumnIter<'a> {
    fn new(rows: &'a [SparseRow], chains: &'a ColumnChains, col: usize) -> Self {
        Self {
            rows,
            chains,
            cursor: chains.head(col),
        }
    }
}

impl Iterator for ColumnIter<'_> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        let link = self.cursor?;
        self.cursor = self.chains.next(link);
        let entry = self.rows.get(link.row)?.entries().get(link.slot)?;
        Some((link.row, entry.val))
    }
}

impl SparseMatrix {
    pub fn has_column_access(&self) -> bool {
        self.columns.is_some()
    }

    pub fn has_diag_access(&self) -> bool {
        self.diag_access
    }

    /// Rebuild the column chains unconditionally.
    pub fn build_column_access(&mut self) -> SparseResult<()> {
        self.columns = Some(ColumnChains::build(&self.rows, self.n_cols)?);
        debug!(n_cols = self.n_cols, nnz = self.nnz(), "built column access");
        Ok(())
    }

    /// Build the column chains if they are missing.
    pub fn ensure_column_access(&mut self) -> SparseResult<()> {
        if self.columns.is_none() {
            self.build_column_access()?;
        }
        Ok(())
    }

    /// Current chains, if valid.
    pub fn column_chains(&self) -> Option<&ColumnChains> {
        self.columns.as_ref()
    }

    fn check_col(&self, col: usize) -> SparseResult<()> {
        if col >= self.n_cols {
            return Err(SparseError::IndexOutOfBounds {
                row: 0,
                col,
                rows: self.rows.len(),
                cols: self.n_cols,
            });
        }
        Ok(())
    }

    /// Traverse column `col` in ascending row order, building the chains
    /// first if needed.
    pub fn column(&mut self, col: usize) -> SparseResult<ColumnIter<'_>> {
        self.check_col(col)?;
        self.ensure_column_access()?;
        let this = &*self;
        let chains = this.columns.as_ref().ok_or_else(|| SparseError::NullHandle {
            what: "column chains".to_string(),
        })?;
        Ok(ColumnIter::new(&this.rows, chains, col))
    }

    /// Traverse column `col` without rebuilding; `None` if the chains are
    /// stale or `col` is out of range.
    pub fn column_cached(&self, col: usize) -> Option<ColumnIter<'_>> {
        if col >= self.n_cols {
            return None;
        }
        self.columns
            .as_ref()
            .map(|chains| ColumnIter::new(&self.rows, chains, col))
    }

    /// Stored entries in column `col`.
    pub fn column_nnz(&mut self, col: usize) -> SparseResult<usize> {
        Ok(self.column(col)?.count())
    }

    /// Cache the index of every row's diagonal entry.
    pub fn build_diag_access(&mut self) {
        for (i, row) in self.rows.iter_mut().enumerate() {
            let diag = row.find_column(i).found();
            trace!(row = i, ?diag, "diagonal lookup");
            row.set_cached_diag(diag);
        }
        self.diag_access = true;
    }

    /// Index within row `i` of the diagonal entry. Uses the cache when valid
    /// and searches otherwise.
    pub fn diag_index(&self, i: usize) -> Option<usize> {
        let row = self.rows.get(i)?;
        if self.diag_access {
            row.cached_diag()
        } else {
            row.find_column(i).found()
        }
    }

    /// True if row `i` stores a diagonal entry (explicit zeros count).
    pub fn has_diag(&self, i: usize) -> bool {
        self.diag_index(i).is_some()
    }

    /// Diagonal value of row `i`, `0.0` if absent.
    pub fn diag_value(&self, i: usize) -> f64 {
        match (self.rows.get(i), self.diag_index(i)) {
            (Some(row), Some(idx)) => row.entries()[idx].val,
            _ => 0.0,
        }
    }
}
