//! Configuration
//!
//! Layered settings: built-in defaults, an optional TOML file, then `LINKNAV_*`
//! environment variables (`__` separates nested keys).

mod facade;
mod merge;
pub mod paths;
mod sources;
mod storage;

pub use facade::ConfigLoader;
pub use storage::CacheConfig;

use crate::error::ApiError;
use crate::loader::SourcePaths;
use crate::logging::LoggingConfig;
use crate::viewport::DEFAULT_ROOT_MARGIN_PX;
use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinknavConfig {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub viewport: ViewportConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl LinknavConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.source.base.trim().is_empty() {
            return Err(ApiError::ConfigError("source.base must not be empty".to_string()));
        }
        if self.source.index_file.trim().is_empty() || self.source.legacy_file.trim().is_empty() {
            return Err(ApiError::ConfigError(
                "source.index_file and source.legacy_file must not be empty".to_string(),
            ));
        }
        self.cache.validate()?;
        if !self.viewport.root_margin_px.is_finite() || self.viewport.root_margin_px < 0.0 {
            return Err(ApiError::ConfigError(format!(
                "viewport.root_margin_px must be a non-negative number, got {}",
                self.viewport.root_margin_px
            )));
        }
        Ok(())
    }
}

/// Where the site's data resources live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// HTTP(S) base URL or local site root directory.
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_index_file")]
    pub index_file: String,
    #[serde(default = "default_legacy_file")]
    pub legacy_file: String,
}

fn default_base() -> String {
    ".".to_string()
}

fn default_data_dir() -> String {
    SourcePaths::default().data_dir
}

fn default_index_file() -> String {
    SourcePaths::default().index_file
}

fn default_legacy_file() -> String {
    SourcePaths::default().legacy_file
}

impl SourceConfig {
    pub fn paths(&self) -> SourcePaths {
        SourcePaths {
            data_dir: self.data_dir.clone(),
            index_file: self.index_file.clone(),
            legacy_file: self.legacy_file.clone(),
        }
    }

    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base: default_base(),
            data_dir: default_data_dir(),
            index_file: default_index_file(),
            legacy_file: default_legacy_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Pixels beyond the viewport edges at which sections start loading.
    #[serde(default = "default_root_margin")]
    pub root_margin_px: f64,
}

fn default_root_margin() -> f64 {
    DEFAULT_ROOT_MARGIN_PX
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            root_margin_px: default_root_margin(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = LinknavConfig::default();
        config.validate().unwrap();
        assert_eq!(config.source.paths(), SourcePaths::default());
        assert_eq!(config.viewport.root_margin_px, 200.0);
        assert!(!config.source.is_remote());
    }

    #[test]
    fn test_negative_margin_rejected() {
        let mut config = LinknavConfig::default();
        config.viewport.root_margin_px = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_remote_detection() {
        let mut config = LinknavConfig::default();
        config.source.base = "https://nav.example.org".to_string();
        assert!(config.source.is_remote());
    }
}
