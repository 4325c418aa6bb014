//! Sparse vectors: `(position, value)` pairs sorted by position.

use crate::error::{filled, reserve_to, SparseError, SparseResult};
use crate::matrix::SparseMatrix;
use crate::row::SparseRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SparsePair {
    pub pos: usize,
    pub val: f64,
}

/// Compact list of `(position, value)` pairs. `len() <= max_dim()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    elts: Vec<SparsePair>,
}

impl SparseVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_dim: usize) -> SparseResult<Self> {
        let mut elts = Vec::new();
        reserve_to(&mut elts, max_dim)?;
        Ok(Self { elts })
    }

    /// Keep entries of `x` with `|value| > threshold`.
    pub fn from_dense(x: &[f64], threshold: f64) -> Self {
        let elts = x
            .iter()
            .enumerate()
            .filter(|(_, v)| v.abs() > threshold)
            .map(|(pos, &val)| SparsePair { pos, val })
            .collect();
        Self { elts }
    }

    /// Copy a matrix row; columns become positions.
    pub fn from_row(row: &SparseRow) -> Self {
        let elts = row
            .iter()
            .map(|(pos, val)| SparsePair { pos, val })
            .collect();
        Self { elts }
    }

    /// Number of stored pairs.
    pub fn len(&self) -> usize {
        self.elts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    pub fn max_dim(&self) -> usize {
        self.elts.capacity()
    }

    pub fn pairs(&self) -> &[SparsePair] {
        &self.elts
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.elts.iter().map(|p| (p.pos, p.val))
    }

    pub fn get(&self, pos: usize) -> f64 {
        self.elts
            .binary_search_by_key(&pos, |p| p.pos)
            .map_or(0.0, |idx| self.elts[idx].val)
    }

    pub fn set(&mut self, pos: usize, val: f64) -> SparseResult<()> {
        match self.elts.binary_search_by_key(&pos, |p| p.pos) {
            Ok(idx) => self.elts[idx].val = val,
            Err(idx) => {
                if self.elts.len() == self.elts.capacity() {
                    let target = (2 * self.elts.len()).max(self.elts.len() + 1);
                    reserve_to(&mut self.elts, target)?;
                }
                self.elts.insert(idx, SparsePair { pos, val });
            }
        }
        Ok(())
    }

    /// Largest stored position plus one, or `0` when empty.
    pub fn extent(&self) -> usize {
        self.elts.last().map_or(0, |p| p.pos + 1)
    }

    /// Scatter into a dense vector of length `n`.
    pub fn to_dense(&self, n: usize) -> SparseResult<Vec<f64>> {
        if self.extent() > n {
            return Err(SparseError::IndexOutOfBounds {
                row: self.extent() - 1,
                col: 0,
                rows: n,
                cols: 1,
            });
        }
        let mut x = filled(n, 0.0)?;
        for p in &self.elts {
            x[p.pos] = p.val;
        }
        Ok(x)
    }

    /// Inner product with a dense vector.
    pub fn dot_dense(&self, x: &[f64]) -> SparseResult<f64> {
        if self.extent() > x.len() {
            return Err(SparseError::DimensionMismatch {
                op: "dot_dense",
                left: (self.extent(), 1),
                right: (x.len(), 1),
            });
        }
        Ok(self.elts.iter().map(|p| p.val * x[p.pos]).sum())
    }
}

impl SparseMatrix {
    /// `y = A x` for sparse `x`. Row `i` appears in `y` when its pattern
    /// meets the pattern of `x`.
    pub fn mul_sparse_vec(&self, x: &SparseVector) -> SparseResult<SparseVector> {
        if x.extent() > self.n_cols {
            return Err(SparseError::DimensionMismatch {
                op: "mul_sparse_vec",
                left: self.shape(),
                right: (x.extent(), 1),
            });
        }
        let xp = x.pairs();
        let mut y = SparseVector::new();
        for (i, row) in self.rows.iter().enumerate() {
            let a = row.entries();
            let (mut p, mut q) = (0, 0);
            let mut acc = None;
            while p < a.len() && q < xp.len() {
                if a[p].col == xp[q].pos {
                    *acc.get_or_insert(0.0) += a[p].val * xp[q].val;
                    p += 1;
                    q += 1;
                } else if a[p].col < xp[q].pos {
                    p += 1;
                } else {
                    q += 1;
                }
            }
            if let Some(val) = acc {
                y.elts.push(SparsePair { pos: i, val });
            }
        }
        Ok(y)
    }
}
