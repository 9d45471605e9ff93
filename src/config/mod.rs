// src/config/mod.rs

//! Configuration loading and validation for sitewatch.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`), TOML or flat `key=value`
//!   (`legacy.rs`).
//! - Validate urls, durations and alert credentials (`validate.rs`).
//!
//! A config error is fatal: it aborts startup before any task is spawned.

pub mod duration;
pub mod legacy;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::parse_duration;
pub use loader::{default_config_path, load_and_validate, load_from_path};
pub use model::{
    AlertConfig, AlertSection, ConfigFile, ConfigSection, RawConfigFile, Settings,
    TargetConfig, TwilioCredentials, TwilioSection, TWILIO_API_BASE,
};
pub use validate::validate_url;
