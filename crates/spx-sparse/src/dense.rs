//! Conversion to and from dense `faer` matrices.

use faer::Mat;

use crate::error::SparseResult;
use crate::matrix::SparseMatrix;
use crate::row::SparseRow;

impl SparseMatrix {
    /// Dense copy; absent entries become `0.0`.
    pub fn to_dense(&self) -> Mat<f64> {
        let mut dense = Mat::<f64>::zeros(self.rows(), self.cols());
        for (i, j, v) in self.triplets() {
            dense.write(i, j, v);
        }
        dense
    }

    /// Sparse copy of `dense` keeping entries with `|value| > threshold`.
    pub fn from_dense(dense: &Mat<f64>, threshold: f64) -> SparseResult<SparseMatrix> {
        let (n_rows, n_cols) = (dense.nrows(), dense.ncols());
        let mut matrix = SparseMatrix::new(0, n_cols, 0)?;
        matrix.rows = (0..n_rows)
            .map(|i| {
                SparseRow::from_pairs(
                    (0..n_cols)
                        .map(|j| (j, dense.read(i, j)))
                        .filter(|(_, v)| v.abs() > threshold),
                )
            })
            .collect();
        Ok(matrix)
    }
}
