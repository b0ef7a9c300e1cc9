//! XDG Base Directory utilities for cache and state locations.

use crate::error::ApiError;
use std::path::PathBuf;

/// Get XDG cache home directory
///
/// Returns `$XDG_CACHE_HOME` if set, otherwise the platform cache directory
/// reported by `directories` (`$HOME/.cache` on Linux).
pub fn cache_home() -> Result<PathBuf, ApiError> {
    if let Ok(xdg_cache_home) = std::env::var("XDG_CACHE_HOME") {
        if !xdg_cache_home.is_empty() {
            return Ok(PathBuf::from(xdg_cache_home));
        }
    }

    directories::BaseDirs::new()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or_else(|| {
            ApiError::ConfigError(
                "Could not determine cache home directory (HOME not set)".to_string(),
            )
        })
}

/// Directory holding the persistent fragment store
///
/// Returns `<cache home>/linknav/fragments`. The directory is created on open,
/// not here.
pub fn fragment_cache_dir() -> Result<PathBuf, ApiError> {
    Ok(cache_home()?.join("linknav").join("fragments"))
}

/// Platform state directory for log files
pub fn state_dir() -> Result<PathBuf, ApiError> {
    let project_dirs = directories::ProjectDirs::from("", "linknav", "linknav").ok_or_else(|| {
        ApiError::ConfigError("Could not determine platform state directory".to_string())
    })?;
    Ok(project_dirs
        .state_dir()
        .unwrap_or_else(|| project_dirs.data_local_dir())
        .to_path_buf())
}
