//! Configuration - layered YAML config with engine limits
//!
//! Layers are applied in order: built-in defaults, the user config file
//! (`<config dir>/sanity-lab/config.yaml`), then an explicit `--config` file.
//! Keys missing from a layer keep the value from the layer below.

use directories::ProjectDirs;
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default upper bound on samples per run
pub const DEFAULT_MAX_SAMPLE_COUNT: u32 = 100_000;

/// Default number of samples for new sessions
pub const DEFAULT_SAMPLE_COUNT: u32 = 10_000;

/// Default cap on raw samples kept for display
pub const DEFAULT_RETAINED_SAMPLE_CAP: usize = 10_000;

/// Default zstd level for share links
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 9;

/// Default number of histogram bins
pub const DEFAULT_HISTOGRAM_BINS: usize = 40;

/// Longest formula accepted, in characters
pub const MAX_FORMULA_LEN: usize = 1_000;

/// Resource limits applied by the engine and the session validator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted `sample_count`
    pub max_sample_count: u32,

    /// Largest number of raw samples kept when retention is requested
    pub retained_sample_cap: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sample_count: DEFAULT_MAX_SAMPLE_COUNT,
            retained_sample_cap: DEFAULT_RETAINED_SAMPLE_CAP,
        }
    }
}

/// Effective configuration after all layers are applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabConfig {
    pub max_sample_count: u32,
    pub default_sample_count: u32,
    pub retained_sample_cap: usize,
    pub compression_level: i32,
    pub histogram_bins: usize,
    pub share_base_url: Option<String>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            max_sample_count: DEFAULT_MAX_SAMPLE_COUNT,
            default_sample_count: DEFAULT_SAMPLE_COUNT,
            retained_sample_cap: DEFAULT_RETAINED_SAMPLE_CAP,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            histogram_bins: DEFAULT_HISTOGRAM_BINS,
            share_base_url: None,
        }
    }
}

/// One config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub max_sample_count: Option<u32>,
    pub default_sample_count: Option<u32>,
    pub retained_sample_cap: Option<usize>,
    pub compression_level: Option<i32>,
    pub histogram_bins: Option<usize>,
    pub share_base_url: Option<String>,
}

/// Errors loading or validating configuration
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    #[diagnostic(code(sanity_lab::config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    #[diagnostic(code(sanity_lab::config::parse))]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(sanity_lab::config::invalid))]
    Invalid(String),
}

impl LabConfig {
    /// Load defaults, then the user config file, then `explicit` if given.
    ///
    /// A missing user config file is not an error; a missing explicit one is.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(global) = Self::global_path() {
            if global.exists() {
                tracing::debug!(path = %global.display(), "loading user config");
                config.apply(ConfigLayer::from_file(&global)?);
            }
        }

        if let Some(path) = explicit {
            tracing::debug!(path = %path.display(), "loading explicit config");
            config.apply(ConfigLayer::from_file(path)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Path of the per-user config file, if a home directory is known
    pub fn global_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sanity-lab").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Overlay every key the layer sets
    pub fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.max_sample_count {
            self.max_sample_count = v;
        }
        if let Some(v) = layer.default_sample_count {
            self.default_sample_count = v;
        }
        if let Some(v) = layer.retained_sample_cap {
            self.retained_sample_cap = v;
        }
        if let Some(v) = layer.compression_level {
            self.compression_level = v;
        }
        if let Some(v) = layer.histogram_bins {
            self.histogram_bins = v;
        }
        if layer.share_base_url.is_some() {
            self.share_base_url = layer.share_base_url;
        }
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sample_count == 0 {
            return Err(ConfigError::Invalid(
                "max_sample_count must be at least 1".to_string(),
            ));
        }
        if self.default_sample_count == 0 || self.default_sample_count > self.max_sample_count {
            return Err(ConfigError::Invalid(format!(
                "default_sample_count must be between 1 and max_sample_count ({}), got {}",
                self.max_sample_count, self.default_sample_count
            )));
        }
        if !(1..=22).contains(&self.compression_level) {
            return Err(ConfigError::Invalid(format!(
                "compression_level must be between 1 and 22, got {}",
                self.compression_level
            )));
        }
        if self.histogram_bins == 0 {
            return Err(ConfigError::Invalid(
                "histogram_bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Engine limits derived from this config
    pub fn limits(&self) -> Limits {
        Limits {
            max_sample_count: self.max_sample_count,
            retained_sample_cap: self.retained_sample_cap,
        }
    }
}

impl ConfigLayer {
    /// Parse a single config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })
    }

    /// Parse config YAML; an empty document is an empty layer
    pub fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = LabConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits(), Limits::default());
    }

    #[test]
    fn test_layer_overrides_only_set_keys() {
        let mut config = LabConfig::default();
        let layer = ConfigLayer::from_yaml("max_sample_count: 500\nhistogram_bins: 12\n").unwrap();
        config.default_sample_count = 100;
        config.apply(layer);

        assert_eq!(config.max_sample_count, 500);
        assert_eq!(config.histogram_bins, 12);
        assert_eq!(config.default_sample_count, 100);
        assert_eq!(config.compression_level, DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_empty_layer() {
        let layer = ConfigLayer::from_yaml("  \n").unwrap();
        assert!(layer.max_sample_count.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(ConfigLayer::from_yaml("max_samples: 5\n").is_err());
    }

    #[test]
    fn test_default_above_max_is_invalid() {
        let mut config = LabConfig::default();
        config.apply(ConfigLayer {
            max_sample_count: Some(100),
            ..Default::default()
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_explicit_file_applied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lab.yaml");
        fs::write(
            &path,
            "max_sample_count: 20000\ndefault_sample_count: 2000\nshare_base_url: https://example.com/lab\n",
        )
        .unwrap();

        let layer = ConfigLayer::from_file(&path).unwrap();
        let mut config = LabConfig::default();
        config.apply(layer);
        assert_eq!(config.max_sample_count, 20_000);
        assert_eq!(config.default_sample_count, 2_000);
        assert_eq!(
            config.share_base_url.as_deref(),
            Some("https://example.com/lab")
        );
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempdir().unwrap();
        let err = LabConfig::load(Some(&dir.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
