//! Matrix-level algebra and matrix-vector products.
//!
//! Binary operations apply the row merge algebra row by row. Three forms are
//! offered:
//!
//! - value-returning (`add`, `sub`, `scaled_add`, `scale`) build a new matrix
//! - `*_assign` update `self` in place, covering `C` aliasing `A`
//! - [`SparseMatrix::scaled_add_into`] writes into an existing destination,
//!   which is where [`PatternPolicy::Restricted`] is useful
//!
//! ```
//! use spx_sparse::{PatternPolicy, SparseMatrix};
//!
//! let a = SparseMatrix::from_triplets(2, 2, [(0, 0, 1.0), (1, 1, 1.0)]).unwrap();
//! let b = SparseMatrix::from_triplets(2, 2, [(0, 1, 2.0), (1, 1, 2.0)]).unwrap();
//!
//! let c = a.scaled_add(&b, 0.5).unwrap();
//! assert_eq!(c.get(0, 1).unwrap(), 1.0);
//! assert_eq!(c.get(1, 1).unwrap(), 2.0);
//!
//! let mut d = a.clone();
//! d.add_assign(&b, PatternPolicy::Restricted).unwrap();
//! assert_eq!(d.nnz(), 2);
//! ```

use crate::error::{filled, reserve_to, SparseError, SparseResult};
use crate::matrix::SparseMatrix;
use crate::merge::{MergeOptions, PatternPolicy};
use crate::row::SparseRow;

impl SparseMatrix {
    fn check_same_shape(&self, op: &'static str, other: &SparseMatrix) -> SparseResult<()> {
        if self.shape() != other.shape() {
            return Err(SparseError::DimensionMismatch {
                op,
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(())
    }

    fn merge_options(&self, policy: PatternPolicy) -> MergeOptions {
        MergeOptions::union()
            .with_policy(policy)
            .with_growth(self.growth)
    }

    /// `A + B` with the union pattern.
    pub fn add(&self, other: &SparseMatrix) -> SparseResult<SparseMatrix> {
        self.scaled_add(other, 1.0)
    }

    /// `A - B` with the union pattern.
    pub fn sub(&self, other: &SparseMatrix) -> SparseResult<SparseMatrix> {
        self.scaled_add(other, -1.0)
    }

    /// `A + alpha * B` with the union pattern.
    pub fn scaled_add(&self, other: &SparseMatrix, alpha: f64) -> SparseResult<SparseMatrix> {
        self.check_same_shape("scaled_add", other)?;
        let opts = self.merge_options(PatternPolicy::Union);
        let mut rows = Vec::new();
        reserve_to(&mut rows, self.rows.len())?;
        for (r1, r2) in self.rows.iter().zip(&other.rows) {
            let mut out = SparseRow::new();
            SparseRow::scaled_add_into(r1, r2, alpha, opts, &mut out)?;
            rows.push(out);
        }
        Ok(SparseMatrix::from_rows(rows, self.n_cols, self.growth))
    }

    /// `alpha * A`.
    pub fn scale(&self, alpha: f64) -> SparseMatrix {
        let mut out = self.clone();
        out.scale_in_place(alpha);
        out
    }

    /// `A <- A + alpha * B`.
    pub fn scaled_add_assign(
        &mut self,
        other: &SparseMatrix,
        alpha: f64,
        policy: PatternPolicy,
    ) -> SparseResult<()> {
        self.check_same_shape("scaled_add_assign", other)?;
        let opts = self.merge_options(policy);
        let result = self
            .rows
            .iter_mut()
            .zip(&other.rows)
            .try_for_each(|(r1, r2)| r1.scaled_add_assign(r2, alpha, opts));
        self.invalidate_access();
        result
    }

    /// `A <- A + B`.
    pub fn add_assign(&mut self, other: &SparseMatrix, policy: PatternPolicy) -> SparseResult<()> {
        self.scaled_add_assign(other, 1.0, policy)
    }

    /// `A <- A - B`.
    pub fn sub_assign(&mut self, other: &SparseMatrix, policy: PatternPolicy) -> SparseResult<()> {
        self.scaled_add_assign(other, -1.0, policy)
    }

    /// `A <- alpha * A`. The pattern is unchanged.
    pub fn scale_in_place(&mut self, alpha: f64) {
        for row in &mut self.rows {
            row.scale(alpha, 0);
        }
    }

    /// `out <- a + alpha * b`, where `out` already has the operands' shape.
    ///
    /// With [`PatternPolicy::Restricted`] `out` keeps its pattern and only
    /// its values are refreshed.
    pub fn scaled_add_into(
        a: &SparseMatrix,
        b: &SparseMatrix,
        alpha: f64,
        policy: PatternPolicy,
        out: &mut SparseMatrix,
    ) -> SparseResult<()> {
        a.check_same_shape("scaled_add_into", b)?;
        a.check_same_shape("scaled_add_into", out)?;
        let opts = out.merge_options(policy);
        let result = a
            .rows
            .iter()
            .zip(&b.rows)
            .zip(out.rows.iter_mut())
            .try_for_each(|((r1, r2), dst)| SparseRow::scaled_add_into(r1, r2, alpha, opts, dst));
        out.invalidate_access();
        result
    }

    /// `y = A x`, touching stored entries only.
    pub fn mul_vec(&self, x: &[f64]) -> SparseResult<Vec<f64>> {
        let mut y = filled(self.rows.len(), 0.0)?;
        self.mul_vec_into(x, &mut y)?;
        Ok(y)
    }

    /// `y = A x` into a caller-provided buffer.
    pub fn mul_vec_into(&self, x: &[f64], y: &mut [f64]) -> SparseResult<()> {
        if x.len() != self.n_cols || y.len() != self.rows.len() {
            return Err(SparseError::DimensionMismatch {
                op: "mul_vec",
                left: self.shape(),
                right: (x.len(), y.len()),
            });
        }
        for (yi, row) in y.iter_mut().zip(&self.rows) {
            *yi = row.iter().map(|(j, v)| v * x[j]).sum();
        }
        Ok(())
    }

    /// `y = A^T x`, accumulated column by column along the chains.
    pub fn mul_vec_transposed(&mut self, x: &[f64]) -> SparseResult<Vec<f64>> {
        if x.len() != self.rows.len() {
            return Err(SparseError::DimensionMismatch {
                op: "mul_vec_transposed",
                left: self.shape(),
                right: (x.len(), 1),
            });
        }
        let mut y = filled(self.n_cols, 0.0)?;
        for (j, yj) in y.iter_mut().enumerate() {
            *yj = self.column(j)?.map(|(i, v)| v * x[i]).sum();
        }
        Ok(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diag3() -> SparseMatrix {
        let mut a = SparseMatrix::new(3, 3, 2).unwrap();
        a.set(0, 0, 1.0).unwrap();
        a.set(1, 1, 2.0).unwrap();
        a.set(2, 2, 3.0).unwrap();
        a.set(0, 2, 5.0).unwrap();
        a
    }

    #[test]
    fn test_mul_vec() {
        let a = diag3();
        assert_eq!(a.mul_vec(&[1.0, 1.0, 1.0]).unwrap(), vec![6.0, 2.0, 3.0]);
    }

    #[test]
    fn test_mul_vec_dimension_mismatch() {
        let a = diag3();
        assert!(matches!(
            a.mul_vec(&[1.0, 1.0]),
            Err(SparseError::DimensionMismatch { op: "mul_vec", .. })
        ));
    }

    #[test]
    fn test_mul_vec_transposed_builds_chains() {
        let mut a = diag3();
        assert!(!a.has_column_access());
        let y = a.mul_vec_transposed(&[1.0, 1.0, 1.0]).unwrap();
        assert_eq!(y, vec![1.0, 2.0, 8.0]);
        assert!(a.has_column_access());
    }

    #[test]
    fn test_mul_vec_transposed_allocation_failure() {
        let mut a = SparseMatrix::new(1, usize::MAX, 0).unwrap();
        assert!(matches!(
            a.mul_vec_transposed(&[1.0]),
            Err(SparseError::AllocationFailure { .. })
        ));
    }

    #[test]
    fn test_add_sub() {
        let a = diag3();
        let b = SparseMatrix::from_triplets(3, 3, [(0, 1, 1.0), (2, 2, 1.0)]).unwrap();
        let c = a.add(&b).unwrap();
        assert_eq!(c.get(0, 1).unwrap(), 1.0);
        assert_eq!(c.get(2, 2).unwrap(), 4.0);
        assert_eq!(c.nnz(), 5);

        let d = a.sub(&b).unwrap();
        assert_eq!(d.get(0, 1).unwrap(), -1.0);
        assert_eq!(d.get(2, 2).unwrap(), 2.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = diag3();
        let b = SparseMatrix::new(3, 4, 1).unwrap();
        assert!(matches!(
            a.add(&b),
            Err(SparseError::DimensionMismatch { left: (3, 3), right: (3, 4), .. })
        ));
    }

    #[test]
    fn test_assign_aliasing_self() {
        let mut a = diag3();
        let snapshot = a.clone();
        a.scaled_add_assign(&snapshot, 1.0, PatternPolicy::Union).unwrap();
        assert_eq!(a, snapshot.scale(2.0));
    }

    #[test]
    fn test_restricted_refresh_keeps_pattern() {
        let a = diag3();
        let b = SparseMatrix::from_triplets(3, 3, [(1, 0, 7.0), (1, 1, 1.0)]).unwrap();
        let mut out = a.clone();
        out.build_column_access().unwrap();
        SparseMatrix::scaled_add_into(&a, &b, 2.0, PatternPolicy::Restricted, &mut out).unwrap();
        assert_eq!(out.nnz(), a.nnz());
        assert_eq!(out.get(1, 1).unwrap(), 4.0);
        assert_eq!(out.get(1, 0).unwrap(), 0.0);
        assert_eq!(out.row_len(1), 1);
        assert!(!out.has_column_access());
    }

    #[test]
    fn test_scale() {
        let a = diag3().scale(-2.0);
        assert_eq!(a.get(0, 2).unwrap(), -10.0);
    }
}
