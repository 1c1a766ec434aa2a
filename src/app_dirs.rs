//! Centralized application directory paths.
//!
//! Provides a single source of truth for all filesystem paths used by the
//! engine. Uses the [`dirs`] crate for platform-appropriate directory
//! resolution.
//!
//! # Environment Overrides
//!
//! All paths can be overridden for testing or custom deployments:
//! - `KISAN_DATA_DIR` — overrides [`data_dir`]
//! - `KISAN_CONFIG_DIR` — overrides [`config_dir`]

use std::path::PathBuf;

/// Application data root directory.
///
/// Used for persistent user data: the response cache and the growth
/// record log.
///
/// Resolves to `dirs::data_dir()/kisan/` by default. Override with the
/// `KISAN_DATA_DIR` environment variable.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("KISAN_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("kisan"))
        .unwrap_or_else(|| PathBuf::from("/tmp/kisan-data"))
}

/// Application config directory.
///
/// Used for `config.toml`.
///
/// Resolves to `dirs::config_dir()/kisan/` by default. Override with the
/// `KISAN_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("KISAN_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("kisan"))
        .unwrap_or_else(|| PathBuf::from("/tmp/kisan-config"))
}

/// Response cache directory (`data_dir()/cache/`).
#[must_use]
pub fn cache_dir() -> PathBuf {
    data_dir().join("cache")
}

/// Growth record log file (`data_dir()/growth.json`).
#[must_use]
pub fn growth_log_path() -> PathBuf {
    data_dir().join("growth.json")
}

/// Default config file path (`config_dir()/config.toml`).
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}
