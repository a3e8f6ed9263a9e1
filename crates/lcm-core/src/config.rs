//! Migration configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! [layout]
//! merge_labels = true
//! max_label_gap = 48
//!
//! [alignment]
//! max_snap = 8
//!
//! [entities]
//! dynamic_schema = true
//!
//! [logging]
//! filter = "info"
//! json = false
//! ```

use crate::error::CoreError;
use lcm_layout::{AlignmentOptions, LayoutOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete migration configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    /// Layout engine settings
    pub layout: LayoutOptions,
    /// Alignment pre-pass settings
    pub alignment: AlignmentOptions,
    /// Entity generation settings
    pub entities: EntityOptions,
    /// Log output settings
    pub logging: LoggingOptions,
}

/// Entity generation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityOptions {
    /// The target model accepts newly synthesized relationship properties
    pub dynamic_schema: bool,
}

impl Default for EntityOptions {
    fn default() -> Self {
        Self {
            dynamic_schema: true,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingOptions {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub filter: String,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// [`CoreError::ConfigParse`] on malformed TOML or mistyped fields
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`CoreError::ConfigIo`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// [`CoreError::ConfigRender`] if serialization fails
    pub fn to_toml_string(&self) -> Result<String, CoreError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// With schema generation switched on or off
    #[inline]
    #[must_use]
    pub fn with_dynamic_schema(mut self, dynamic: bool) -> Self {
        self.entities.dynamic_schema = dynamic;
        self
    }

    /// With alignment switched on or off
    #[inline]
    #[must_use]
    pub fn with_alignment(mut self, enabled: bool) -> Self {
        self.alignment.enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(MigrationConfig::from_toml_str("").unwrap(), MigrationConfig::default());
    }

    #[test]
    fn defaults() {
        let config = MigrationConfig::new();
        assert!(config.layout.merge_labels);
        assert_eq!(config.layout.label_row_tolerance, 4);
        assert_eq!(config.layout.max_label_gap, 48);
        assert_eq!(config.alignment.max_snap, 8);
        assert!(config.entities.dynamic_schema);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = MigrationConfig::from_toml_str(
            "[layout]\nmerge_labels = false\n\n[alignment]\nmax_snap = 4\n",
        )
        .unwrap();
        assert!(!config.layout.merge_labels);
        assert!(config.layout.auto_size_labels);
        assert_eq!(config.alignment.max_snap, 4);
        assert!(config.alignment.enabled);
    }

    #[test]
    fn render_and_reload() {
        let config = MigrationConfig::new().with_dynamic_schema(false).with_alignment(false);
        let text = config.to_toml_string().unwrap();
        assert_eq!(MigrationConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn mistyped_field_is_rejected() {
        assert!(MigrationConfig::from_toml_str("[layout]\nmerge_labels = 3\n").is_err());
    }

    #[test]
    fn load_missing_file() {
        let err = MigrationConfig::load("/nonexistent/lcm.toml").unwrap_err();
        assert!(matches!(err, CoreError::ConfigIo { .. }));
    }
}
