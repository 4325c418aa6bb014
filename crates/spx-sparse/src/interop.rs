//! Conversion to and from `sprs` compressed matrices.

use sprs::CsMat;

use crate::error::{SparseError, SparseResult};
use crate::matrix::SparseMatrix;
use crate::row::SparseRow;

impl SparseMatrix {
    /// CSR copy. Explicit zeros stay stored.
    pub fn to_csmat(&self) -> CsMat<f64> {
        let mut indptr = Vec::with_capacity(self.rows() + 1);
        let mut indices = Vec::with_capacity(self.nnz());
        let mut data = Vec::with_capacity(self.nnz());
        indptr.push(0);
        for row in &self.rows {
            for (j, v) in row.iter() {
                indices.push(j);
                data.push(v);
            }
            indptr.push(indices.len());
        }
        CsMat::new(self.shape(), indptr, indices, data)
    }

    /// Copy a CSR or CSC matrix.
    pub fn from_csmat(mat: &CsMat<f64>) -> SparseResult<SparseMatrix> {
        let csr = if mat.is_csr() {
            mat.clone()
        } else {
            mat.to_other_storage()
        };
        let (n_rows, n_cols) = csr.shape();
        let mut rows = Vec::with_capacity(n_rows);
        for (i, vec) in csr.outer_iterator().enumerate() {
            let row = SparseRow::from_pairs(vec.iter().map(|(j, &v)| (j, v)));
            if let Some(col) = row.last_col().filter(|&c| c >= n_cols) {
                return Err(SparseError::IndexOutOfBounds {
                    row: i,
                    col,
                    rows: n_rows,
                    cols: n_cols,
                });
            }
            rows.push(row);
        }
        let mut matrix = SparseMatrix::new(0, n_cols, 0)?;
        matrix.rows = rows;
        Ok(matrix)
    }
}
