//! Cache settings and storage path resolution.

use super::paths;
use crate::cache::{CacheSettings, CURRENT_VERSION, DEFAULT_NAMESPACE};
use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

fn default_true() -> bool {
    true
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_version() -> String {
    CURRENT_VERSION.to_string()
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

/// Persistent fragment cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Key namespace (`<namespace>_<categoryId>_<version>`)
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Cache schema version; changing it orphans every existing entry
    #[serde(default = "default_version")]
    pub version: String,

    /// Entry lifetime in seconds
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    /// Storage location; None means the platform cache directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.namespace.trim().is_empty() {
            return Err(ApiError::ConfigError("cache.namespace must not be empty".to_string()));
        }
        if self.version.trim().is_empty() {
            return Err(ApiError::ConfigError("cache.version must not be empty".to_string()));
        }
        if self.ttl_secs == 0 {
            return Err(ApiError::ConfigError("cache.ttl_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn settings(&self) -> CacheSettings {
        CacheSettings {
            enabled: self.enabled,
            namespace: self.namespace.clone(),
            version: self.version.clone(),
            ttl: Duration::from_secs(self.ttl_secs),
        }
    }

    /// Resolve the storage directory, falling back to the platform cache dir.
    pub fn resolve_path(&self) -> Result<PathBuf, ApiError> {
        match &self.path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path.clone()),
            _ => paths::fragment_cache_dir(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            namespace: default_namespace(),
            version: default_version(),
            ttl_secs: default_ttl_secs(),
            path: None,
        }
    }
}
