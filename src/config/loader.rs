// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; defaults that depend on other
/// sections are not resolved and nothing is validated. Use
/// [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path, resolve defaults and validate.
///
/// Checks for:
/// - empty or identical source/output directories,
/// - a zero server port or queue length,
/// - empty command lines,
/// - invalid globs and regular expressions in the service-worker section.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Like [`load_and_validate`], but a missing file at the *default* location
/// yields the built-in configuration instead of an error.
///
/// An explicitly requested path must exist.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() && path == default_config_path() {
        info!(path = ?path, "no config file found; using built-in defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Config file looked up in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Taskgraph.toml")
}
