//! ConfigLoader facade delegating to merge service.

use super::merge::service::MergeService;
use super::LinknavConfig;
use crate::error::ApiError;
use std::path::Path;

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from defaults and environment, or from `file` with
    /// the environment layered on top. The result is validated.
    pub fn load(file: Option<&Path>) -> Result<LinknavConfig, ApiError> {
        let config = match file {
            Some(path) => MergeService::load_from_file(path)?,
            None => MergeService::load()?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create default configuration.
    pub fn default() -> LinknavConfig {
        LinknavConfig::default()
    }
}
