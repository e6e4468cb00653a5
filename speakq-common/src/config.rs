//! Configuration file resolution and TOML loading
//!
//! Config file lookup follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`~/.config/<app>/config.toml` on Linux)
//! 4. System-wide file (`/etc/<app>/config.toml`, Unix only)
//!
//! A missing config file is not an error: services fall back to built-in defaults.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name looked up inside each candidate config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Resolve which TOML config file to load.
///
/// Returns `None` when no candidate exists. An explicit path (CLI or env) is
/// returned even if it does not exist so the caller can report it.
pub fn resolve_config_file(
    cli_arg: Option<&Path>,
    env_var_name: &str,
    app_name: &str,
) -> Option<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    // Priority 3/4: platform locations
    default_config_candidates(app_name)
        .into_iter()
        .find(|candidate| candidate.exists())
}

/// Platform config file candidates, most specific first
pub fn default_config_candidates(app_name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(app_name).join(CONFIG_FILE_NAME));
    }

    if cfg!(unix) {
        candidates.push(PathBuf::from("/etc").join(app_name).join(CONFIG_FILE_NAME));
    }

    candidates
}

/// Load a TOML config file, or built-in defaults when `path` is `None`.
///
/// # Errors
/// - The file was named explicitly but cannot be read
/// - The file content is not valid TOML for `T`
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        info!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    debug!("Loading config file: {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|e| {
        warn!("Failed to read config file {}: {}", path.display(), e);
        Error::Config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let config = toml::from_str::<T>(&content).map_err(|source| Error::TomlParse {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}
