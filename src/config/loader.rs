//! Configuration file discovery and loading.
//!
//! Sources, later overriding earlier:
//! 1. Built-in defaults
//! 2. A config file: the explicit `--config` path, or `~/.memeplot/config.yml`
//!    when it exists
//! 3. `MEMEPLOT_*` environment variables
//!
//! CLI flags are layered on top by the command dispatcher.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::schema::CacheConfig;
use crate::error::{MemeError, Result};

/// Overrides `api_base`.
pub const ENV_API_BASE: &str = "MEMEPLOT_API_BASE";
/// Overrides `cache_dir`.
pub const ENV_CACHE_DIR: &str = "MEMEPLOT_CACHE_DIR";
/// Overrides `cache_enabled`.
pub const ENV_CACHE_ENABLED: &str = "MEMEPLOT_CACHE_ENABLED";

/// The user's global config file location: `~/.memeplot/config.yml`.
pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".memeplot").join("config.yml"))
}

/// Parse configuration from YAML text. An empty document yields defaults.
pub fn parse_config(content: &str, path: &Path) -> Result<CacheConfig> {
    if content.trim().is_empty() {
        return Ok(CacheConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| MemeError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load a config file that must exist.
pub fn load_config_file(path: &Path) -> Result<CacheConfig> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MemeError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => MemeError::Io(e),
    })?;

    parse_config(&content, path)
}

/// Apply `MEMEPLOT_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: CacheConfig, lookup: F) -> Result<CacheConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_base) = lookup(ENV_API_BASE).filter(|v| !v.is_empty()) {
        config.api_base = api_base;
    }

    if let Some(dir) = lookup(ENV_CACHE_DIR).filter(|v| !v.is_empty()) {
        config.cache_dir = Some(PathBuf::from(dir));
    }

    if let Some(raw) = lookup(ENV_CACHE_ENABLED) {
        config.cache_enabled = parse_bool(&raw).ok_or_else(|| MemeError::InvalidInput {
            message: format!("{} must be true or false, got '{}'", ENV_CACHE_ENABLED, raw),
        })?;
    }

    Ok(config)
}

/// Load the effective configuration.
///
/// An explicit path must exist; the default path is optional.
pub fn load_config(explicit: Option<&Path>) -> Result<CacheConfig> {
    let config = match explicit {
        Some(path) => load_config_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                load_config_file(&path)?
            }
            None => CacheConfig::default(),
        },
    };

    apply_env_overrides(config, |name| std::env::var(name).ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
