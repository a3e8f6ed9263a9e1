//! Error types for migration runs
//!
//! Per-binding, per-relationship and per-overlap problems never surface here;
//! they become [`crate::report::Diagnostic`]s. [`CoreError`] covers what stops
//! a run: unreadable input, invalid configuration, a failing sink or
//! cancellation.

use lcm_entity::SinkError;
use std::path::PathBuf;

/// Fatal migration error
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration file could not be read
    #[error("failed to read configuration {path}: {source}")]
    ConfigIo {
        /// Configuration file
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for [`crate::MigrationConfig`]
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("failed to render configuration: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    /// Input document could not be read
    #[error("failed to read input {path}: {source}")]
    InputIo {
        /// Input file
        path: PathBuf,
        /// Cause
        #[source]
        source: std::io::Error,
    },

    /// Input document is malformed
    #[error("invalid input document: {0}")]
    InputParse(#[from] serde_json::Error),

    /// Entity model could not be saved
    #[error("sink error: {0}")]
    Sink(#[from] SinkError),

    /// Run cancelled between units of work
    #[error("migration cancelled before {unit}")]
    Cancelled {
        /// Unit of work that was about to start
        unit: String,
    },
}

impl CoreError {
    /// Check if the run was cancelled rather than failing
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}
