//! Tracing subscriber setup.
//!
//! The engine only emits `tracing` events; applications and tests decide
//! whether anything listens. `RUST_LOG` overrides the configured filter.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{SpxError, SpxResult};

/// Install a global fmt subscriber writing to stderr.
///
/// Returns `Ok(false)` if a global subscriber was already installed.
pub fn init_tracing(config: &LoggingConfig) -> SpxResult<bool> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(env) if !env.is_empty() => EnvFilter::try_new(env),
        _ => EnvFilter::try_new(&config.filter),
    }
    .map_err(|e| SpxError::Config(format!("invalid log filter: {e}")))?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(config.ansi)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(filter = %config.filter, "tracing initialised");
    }
    Ok(installed)
}
