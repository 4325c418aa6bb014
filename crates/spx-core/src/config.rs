//! Configuration for the spx engine.
//!
//! [`SpxConfig`] is stored in `~/.spx/config.toml`. Every section uses
//! `#[serde(default)]`, so a file only needs the keys it wants to change.
//!
//! ```
//! use spx_core::{GrowthPolicy, SpxConfig};
//!
//! let config = SpxConfig::from_toml_str(
//!     r#"
//!     [engine]
//!     default_avg_nnz = 4
//!
//!     [engine.growth]
//!     kind = "exact"
//!     "#,
//! )
//! .unwrap();
//! assert_eq!(config.engine.default_avg_nnz, 4);
//! assert_eq!(config.engine.growth, GrowthPolicy::Exact);
//! assert_eq!(config.logging.filter, "info");
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{SpxError, SpxResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpxConfig {
    /// Sparse engine tuning.
    pub engine: EngineConfig,

    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Tuning knobs for matrix storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Initial per-row capacity when the caller gives no estimate.
    pub default_avg_nnz: usize,

    /// How rows grow when an insert finds them full.
    pub growth: GrowthPolicy,

    /// Magnitude at or below which `compact` drops entries.
    pub compact_threshold: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_avg_nnz: 10,
            growth: GrowthPolicy::default(),
            compact_threshold: 0.0,
        }
    }
}

/// Row capacity growth strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GrowthPolicy {
    /// Grow to exactly the requested length.
    Exact,
    /// Grow to `max(requested, ceil(len * factor) + 1, min_len)`.
    Geometric { factor: f64, min_len: usize },
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        GrowthPolicy::Geometric {
            factor: 2.0,
            min_len: 10,
        }
    }
}

impl GrowthPolicy {
    /// Capacity to allocate for a row currently holding `len` entries that
    /// must hold at least `requested`.
    pub fn next_capacity(&self, len: usize, requested: usize) -> usize {
        match *self {
            GrowthPolicy::Exact => requested,
            GrowthPolicy::Geometric { factor, min_len } => {
                let scaled = (len as f64 * factor.max(1.0)).ceil() as usize + 1;
                requested.max(scaled).max(min_len)
            }
        }
    }
}

/// Logging configuration consumed by [`crate::logging::init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,

    /// Emit ANSI colour codes.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: false,
        }
    }
}

impl SpxConfig {
    /// Get the default config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".spx"))
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load configuration from the default location.
    ///
    /// Returns default config if file doesn't exist.
    pub fn load() -> SpxResult<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> SpxResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(contents: &str) -> SpxResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> SpxResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Reject settings the engine cannot honour.
    pub fn validate(&self) -> SpxResult<()> {
        if let GrowthPolicy::Geometric { factor, .. } = self.engine.growth {
            if !factor.is_finite() || factor < 1.0 {
                return Err(SpxError::Config(format!(
                    "growth factor must be a finite value >= 1.0, got {factor}"
                )));
            }
        }
        if !self.engine.compact_threshold.is_finite() || self.engine.compact_threshold < 0.0 {
            return Err(SpxError::Config(format!(
                "compact_threshold must be finite and non-negative, got {}",
                self.engine.compact_threshold
            )));
        }
        Ok(())
    }
}
