// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Per-target failures (fetch, alert delivery) have their own error types in
//! [`crate::fetch`] and [`crate::alert`]; they are recovered inside the poll
//! cycle and never surface here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SitewatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("{0} not found in the list of monitored websites")]
    NotFound(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SitewatchError>;
