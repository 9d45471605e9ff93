// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::legacy::parse_legacy;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// Files ending in `.toml` are read as TOML; anything else is read as the
/// flat `key=value` format (see [`crate::config::legacy`]).
///
/// This only performs deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    let config = if is_toml {
        debug!(?path, "parsing TOML config");
        toml::from_str(&contents)?
    } else {
        debug!(?path, "parsing key=value config");
        parse_legacy(&contents)?
    };

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// This is the recommended entry point for the rest of the application:
///
/// - Reads TOML (or the flat format).
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks urls, uniqueness, durations and alert credentials.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Default config path: `Sitewatch.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sitewatch.toml")
}
