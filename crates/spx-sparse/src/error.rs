//! Errors raised by the sparse engine.

use spx_core::SpxError;
use thiserror::Error;

/// Result alias for sparse engine operations.
pub type SparseResult<T> = Result<T, SparseError>;

/// Errors from sparse matrix, row and vector operations.
///
/// Every error is reported synchronously to the immediate caller; the engine
/// never retries.
#[derive(Debug, Error)]
pub enum SparseError {
    /// Operation on a matrix slot that was never allocated or already freed.
    #[error("null handle: {what}")]
    NullHandle { what: String },

    /// Row or column index outside the declared shape.
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} matrix")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Binary operation on incompatibly shaped operands.
    #[error("dimension mismatch in {op}: {left:?} vs {right:?}")]
    DimensionMismatch {
        op: &'static str,
        left: (usize, usize),
        right: (usize, usize),
    },

    /// Row or matrix storage could not be grown.
    #[error("allocation failure: could not reserve {requested} slots")]
    AllocationFailure { requested: usize },

    /// Malformed text dump.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// I/O error while saving or loading.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A group operation failed on one member; earlier members were already
    /// updated.
    #[error("group member {index} failed: {source}")]
    BatchMember {
        index: usize,
        #[source]
        source: Box<SparseError>,
    },
}

impl SparseError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        SparseError::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Grow `vec` so it can hold at least `capacity` elements without aborting
/// on allocation failure.
pub(crate) fn reserve_to<T>(vec: &mut Vec<T>, capacity: usize) -> SparseResult<()> {
    let additional = capacity.saturating_sub(vec.len());
    vec.try_reserve_exact(additional)
        .map_err(|_| SparseError::AllocationFailure {
            requested: capacity,
        })
}

/// `vec![value; len]` that reports `AllocationFailure` instead of aborting.
pub(crate) fn filled<T: Clone>(len: usize, value: T) -> SparseResult<Vec<T>> {
    let mut vec = Vec::new();
    reserve_to(&mut vec, len)?;
    vec.resize(len, value);
    Ok(vec)
}

impl From<SparseError> for SpxError {
    fn from(err: SparseError) -> Self {
        match err {
            SparseError::Io(io) => SpxError::Io(io),
            SparseError::Parse { .. } => SpxError::Parse(err.to_string()),
            other => SpxError::Sparse(other.to_string()),
        }
    }
}
