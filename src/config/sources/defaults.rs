//! Built-in defaults, seeded from `LinknavConfig::default()`.

use crate::config::LinknavConfig;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Start a builder whose lowest layer is the serialized default config.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let defaults = Config::try_from(&LinknavConfig::default())?;
    Ok(Config::builder().add_source(defaults))
}
