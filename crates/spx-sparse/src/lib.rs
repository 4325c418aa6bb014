//! # spx-sparse: row-major sparse matrix engine
//!
//! Jacobian blocks and similar operators are mostly zero and are assembled
//! one entry or one row at a time. This crate stores them row by row, keeps
//! every row sorted by column, and offers column-wise traversal through
//! lazily built chains.
//!
//! ## Module Organization
//!
//! - [`row`]: [`SparseRow`] storage, column lookup and point updates
//! - [`merge`]: row merge algebra with [`PatternPolicy`]
//! - [`matrix`]: [`SparseMatrix`] storage, resize and compaction
//! - [`algebra`]: matrix add/sub/scale and matrix-vector products
//! - [`access`]: column chains and diagonal caches
//! - [`vector`]: [`SparseVector`]
//! - [`batch`]: [`MatrixGroup`] for families of matrices
//! - [`io`]: lossless text dump/load and debug listings
//! - [`dense`], [`interop`]: `faer` and `sprs` conversions
//!
//! ## Usage
//!
//! ```
//! use spx_sparse::SparseMatrix;
//!
//! let mut a = SparseMatrix::new(3, 3, 2)?;
//! a.set(0, 0, 1.0)?;
//! a.set(1, 1, 2.0)?;
//! a.set(2, 2, 3.0)?;
//! a.set(0, 2, 5.0)?;
//!
//! assert_eq!(a.mul_vec(&[1.0, 1.0, 1.0])?, vec![6.0, 2.0, 3.0]);
//!
//! let column: Vec<(usize, f64)> = a.column(2)?.collect();
//! assert_eq!(column, vec![(0, 5.0), (2, 3.0)]);
//! # Ok::<(), spx_sparse::SparseError>(())
//! ```
//!
//! Not thread-safe beyond what `&`/`&mut` already enforce: a matrix is
//! mutated by one owner at a time and traversals borrow it immutably.

pub mod access;
pub mod algebra;
pub mod batch;
pub mod dense;
pub mod error;
pub mod interop;
pub mod io;
pub mod matrix;
pub mod merge;
pub mod row;
pub mod vector;

pub use access::{ChainLink, ColumnChains, ColumnIter};
pub use batch::MatrixGroup;
pub use error::{SparseError, SparseResult};
pub use matrix::SparseMatrix;
pub use merge::{MergeOptions, PatternPolicy};
pub use row::{ColumnSlot, RowEntry, SparseRow};
pub use spx_core::{EngineConfig, GrowthPolicy};
pub use vector::{SparsePair, SparseVector};
