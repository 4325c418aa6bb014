//! # spx-core: shared plumbing for the spx sparse engine
//!
//! Holds the pieces every spx crate needs but that are not sparse algebra:
//!
//! - [`error`] - the unified [`SpxError`] used at API boundaries
//! - [`config`] - TOML-backed engine and logging settings
//! - [`logging`] - `tracing` subscriber setup
//!
//! The engine itself lives in `spx-sparse`.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{EngineConfig, GrowthPolicy, LoggingConfig, SpxConfig};
pub use error::{SpxError, SpxResult};
pub use logging::init_tracing;
