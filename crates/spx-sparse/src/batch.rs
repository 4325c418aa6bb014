//! Matrix groups: families of matrices allocated, resized and freed together.
//!
//! A typical use is the set of Jacobian blocks of one problem, which share a
//! shape and a lifecycle.
//!
//! Group operations are best effort, not transactional. `resize` walks the
//! members in order and stops at the first failure; members before it have
//! already been resized. Callers needing all-or-nothing behaviour must layer
//! it on top.
//!
//! ```
//! use spx_sparse::MatrixGroup;
//!
//! let mut jacobians = MatrixGroup::create(3, 4, 4, 2).unwrap();
//! jacobians.get_mut(1).unwrap().set(0, 0, 1.0).unwrap();
//! jacobians.resize(6, 6).unwrap();
//! assert!(jacobians.iter().all(|(_, m)| m.shape() == (6, 6)));
//! assert_eq!(jacobians.free(), 3);
//! ```

use spx_core::EngineConfig;
use tracing::{debug, warn};

use crate::error::{reserve_to, SparseError, SparseResult};
use crate::matrix::SparseMatrix;

/// Ordered set of matrix slots. A slot is empty once its member is released.
#[derive(Debug, Default)]
pub struct MatrixGroup {
    members: Vec<Option<SparseMatrix>>,
}

impl MatrixGroup {
    /// Allocate `count` matrices of shape `n_rows x n_cols`. Either every
    /// member is created or none is.
    pub fn create(count: usize, n_rows: usize, n_cols: usize, avg_nnz: usize) -> SparseResult<Self> {
        Self::build(count, |_| SparseMatrix::new(n_rows, n_cols, avg_nnz))
    }

    /// Like [`MatrixGroup::create`] with the configured row capacity and
    /// growth policy.
    pub fn with_config(
        count: usize,
        n_rows: usize,
        n_cols: usize,
        config: &EngineConfig,
    ) -> SparseResult<Self> {
        Self::build(count, |_| SparseMatrix::with_config(n_rows, n_cols, config))
    }

    fn build<F>(count: usize, mut alloc: F) -> SparseResult<Self>
    where
        F: FnMut(usize) -> SparseResult<SparseMatrix>,
    {
        let mut members = Vec::new();
        reserve_to(&mut members, count)?;
        for index in 0..count {
            let matrix = alloc(index).map_err(|source| SparseError::BatchMember {
                index,
                source: Box::new(source),
            })?;
            members.push(Some(matrix));
        }
        debug!(count, "created matrix group");
        Ok(Self { members })
    }

    /// Adopt an existing matrix; returns its slot index.
    pub fn push(&mut self, matrix: SparseMatrix) -> usize {
        self.members.push(Some(matrix));
        self.members.len() - 1
    }

    /// Number of slots, released ones included.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of slots still holding a matrix.
    pub fn live(&self) -> usize {
        self.members.iter().filter(|m| m.is_some()).count()
    }

    fn null_handle(index: usize) -> SparseError {
        SparseError::NullHandle {
            what: format!("group member {index}"),
        }
    }

    pub fn get(&self, index: usize) -> SparseResult<&SparseMatrix> {
        self.members
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| Self::null_handle(index))
    }

    pub fn get_mut(&mut self, index: usize) -> SparseResult<&mut SparseMatrix> {
        self.members
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or_else(|| Self::null_handle(index))
    }

    /// Live members with their slot index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SparseMatrix)> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.as_ref().map(|m| (i, m)))
    }

    /// Resize every member to `n_rows x n_cols`, in slot order.
    ///
    /// Stops at the first member that fails (including a released slot);
    /// earlier members keep their new shape.
    pub fn resize(&mut self, n_rows: usize, n_cols: usize) -> SparseResult<()> {
        for (index, slot) in self.members.iter_mut().enumerate() {
            let result = match slot {
                Some(matrix) => matrix.resize(n_rows, n_cols),
                None => Err(Self::null_handle(index)),
            };
            if let Err(source) = result {
                warn!(index, n_rows, n_cols, "group resize stopped; earlier members already resized");
                return Err(SparseError::BatchMember {
                    index,
                    source: Box::new(source),
                });
            }
        }
        debug!(members = self.members.len(), n_rows, n_cols, "resized matrix group");
        Ok(())
    }

    /// Take one member out of the group, leaving its slot empty.
    pub fn release(&mut self, index: usize) -> SparseResult<SparseMatrix> {
        self.members
            .get_mut(index)
            .and_then(Option::take)
            .ok_or_else(|| Self::null_handle(index))
    }

    /// Free every member and then the group itself. Returns how many live
    /// members were freed.
    pub fn free(self) -> usize {
        let freed = self.live();
        drop(self.members);
        debug!(freed, "freed matrix group");
        freed
    }
}
