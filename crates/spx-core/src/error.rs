//! Unified error types for the spx workspace
//!
//! Domain crates keep their own precise error enums (for example
//! `spx_sparse::SparseError`) and convert into [`SpxError`] when the error
//! crosses into application code.
//!
//! # Example
//!
//! ```
//! use spx_core::{SpxError, SpxResult};
//!
//! fn check_threshold(threshold: f64) -> SpxResult<f64> {
//!     if threshold.is_nan() {
//!         return Err(SpxError::Config("threshold must be a number".into()));
//!     }
//!     Ok(threshold)
//! }
//!
//! assert!(check_threshold(f64::NAN).is_err());
//! ```

use thiserror::Error;

/// Unified error type for all spx operations.
#[derive(Error, Debug)]
pub enum SpxError {
    /// I/O errors (file access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors raised by the sparse engine
    #[error("Sparse engine error: {0}")]
    Sparse(String),

    /// Generic errors (for wrapping external errors)
    #[error("{0}")]
    Other(String),
}

/// Convenience type alias for Results using SpxError.
pub type SpxResult<T> = Result<T, SpxError>;

impl From<anyhow::Error> for SpxError {
    fn from(err: anyhow::Error) -> Self {
        SpxError::Other(err.to_string())
    }
}

impl From<String> for SpxError {
    fn from(s: String) -> Self {
        SpxError::Other(s)
    }
}

impl From<&str> for SpxError {
    fn from(s: &str) -> Self {
        SpxError::Other(s.to_string())
    }
}

impl From<toml::de::Error> for SpxError {
    fn from(err: toml::de::Error) -> Self {
        SpxError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for SpxError {
    fn from(err: toml::ser::Error) -> Self {
        SpxError::Config(err.to_string())
    }
}
