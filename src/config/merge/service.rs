//! MergeService: orchestrates sources, applies precedence, deserializes to LinknavConfig.

use crate::config::sources::{defaults, environment};
use crate::config::LinknavConfig;
use config::{ConfigError, File};
use std::path::Path;

/// Merge service for config composition.
pub struct MergeService;

impl MergeService {
    /// Load config from defaults and environment only.
    /// Precedence: defaults (lowest) -> environment (highest).
    pub fn load() -> Result<LinknavConfig, ConfigError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file with environment overlay.
    /// Precedence: defaults -> file -> environment.
    pub fn load_from_file(path: &Path) -> Result<LinknavConfig, ConfigError> {
        let builder = defaults::builder_with_defaults()?;
        let builder = builder.add_source(File::from(path).required(true));
        let builder = environment::add_to_builder(builder)?;
        builder.build()?.try_deserialize()
    }
}
