//! Environment variable source: LINKNAV_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// Uses LINKNAV_ prefix and __ as separator for nested keys, e.g.
/// `LINKNAV_CACHE__TTL_SECS=3600`.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("LINKNAV")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
